use std::sync::Arc;
use thiserror::Error;

use super::align::{AlignMode, AlignedRow, align};
use super::myers::diff;
use super::script::Line;
use crate::git::BlobPair;
use crate::git::operations::looks_binary;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("{0}")]
    UnsupportedContent(String),
}

/// Decoded text on both sides of a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionPair {
    pub older: Vec<Line>,
    pub newer: Vec<Line>,
}

impl RevisionPair {
    pub fn new(older: Vec<Line>, newer: Vec<Line>) -> Self {
        Self { older, newer }
    }

    pub fn decode(blobs: &BlobPair) -> Result<Self, AlignmentError> {
        if looks_binary(&blobs.older) || looks_binary(&blobs.newer) {
            return Err(AlignmentError::UnsupportedContent(
                "Binary content cannot be diffed".to_string(),
            ));
        }
        Ok(Self {
            older: split_lines(&blobs.older),
            newer: split_lines(&blobs.newer),
        })
    }
}

/// Split on `\n` only; a trailing newline does not start an extra line and `\r` is kept.
pub fn split_lines(bytes: &[u8]) -> Vec<Line> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let text = String::from_utf8_lossy(bytes);
    let body = text.strip_suffix('\n').unwrap_or(&text);
    body.split('\n').map(Arc::from).collect()
}

/// Both layouts of one commit's diff plus its statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedDiff {
    pub inline: Vec<AlignedRow>,
    pub side_by_side: Vec<AlignedRow>,
    pub additions: usize,
    pub deletions: usize,
}

impl AlignedDiff {
    pub fn rows(&self, mode: AlignMode) -> &[AlignedRow] {
        match mode {
            AlignMode::Inline => &self.inline,
            AlignMode::SideBySide => &self.side_by_side,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffView {
    Text(AlignedDiff),
    Unsupported { reason: String },
}

impl DiffView {
    pub fn build(pair: &RevisionPair) -> Self {
        let script = diff(&pair.older, &pair.newer);
        DiffView::Text(AlignedDiff {
            inline: align(&script, AlignMode::Inline),
            side_by_side: align(&script, AlignMode::SideBySide),
            additions: script.additions(),
            deletions: script.deletions(),
        })
    }

    /// Decode and align; binary content yields the placeholder.
    pub fn from_blobs(blobs: &BlobPair) -> Self {
        match RevisionPair::decode(blobs) {
            Ok(pair) => Self::build(&pair),
            Err(err) => err.into(),
        }
    }

    pub fn rows(&self, mode: AlignMode) -> &[AlignedRow] {
        match self {
            DiffView::Text(aligned) => aligned.rows(mode),
            DiffView::Unsupported { .. } => &[],
        }
    }

    pub fn row_count(&self, mode: AlignMode) -> usize {
        self.rows(mode).len()
    }

    pub fn stats(&self) -> Option<(usize, usize)> {
        match self {
            DiffView::Text(aligned) => Some((aligned.additions, aligned.deletions)),
            DiffView::Unsupported { .. } => None,
        }
    }
}

impl From<AlignmentError> for DiffView {
    fn from(err: AlignmentError) -> Self {
        match err {
            AlignmentError::UnsupportedContent(reason) => DiffView::Unsupported { reason },
        }
    }
}

pub type SharedDiff = Arc<DiffView>;
