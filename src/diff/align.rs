use super::script::{EditOp, EditScript, Line};

/// How an edit script is laid out on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignMode {
    /// One row per operation, single colorized column.
    #[default]
    Inline,
    /// Removed / context / added columns with changed lines paired up.
    SideBySide,
}

impl AlignMode {
    pub fn toggle(self) -> Self {
        match self {
            AlignMode::Inline => AlignMode::SideBySide,
            AlignMode::SideBySide => AlignMode::Inline,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlignMode::Inline => "inline",
            AlignMode::SideBySide => "side-by-side",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Context,
    Removed,
    Added,
    Changed,
}

/// A display row. At least one of the three slots is always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRow {
    pub left: Option<Line>,
    pub center: Option<Line>,
    pub right: Option<Line>,
    pub kind: RowKind,
    /// 1-based line number in the older revision.
    pub old_number: Option<usize>,
    /// 1-based line number in the newer revision.
    pub new_number: Option<usize>,
}

impl AlignedRow {
    fn context(old: usize, new: usize, line: Line) -> Self {
        Self {
            left: None,
            center: Some(line),
            right: None,
            kind: RowKind::Context,
            old_number: Some(old + 1),
            new_number: Some(new + 1),
        }
    }

    fn removed(old: usize, line: Line) -> Self {
        Self {
            left: Some(line),
            center: None,
            right: None,
            kind: RowKind::Removed,
            old_number: Some(old + 1),
            new_number: None,
        }
    }

    fn added(new: usize, line: Line) -> Self {
        Self {
            left: None,
            center: None,
            right: Some(line),
            kind: RowKind::Added,
            old_number: None,
            new_number: Some(new + 1),
        }
    }

    fn changed(old: usize, removed: Line, new: usize, added: Line) -> Self {
        Self {
            left: Some(removed),
            center: None,
            right: Some(added),
            kind: RowKind::Changed,
            old_number: Some(old + 1),
            new_number: Some(new + 1),
        }
    }
}

pub fn align(script: &EditScript, mode: AlignMode) -> Vec<AlignedRow> {
    match mode {
        AlignMode::Inline => align_inline(script),
        AlignMode::SideBySide => align_side_by_side(script),
    }
}

fn align_inline(script: &EditScript) -> Vec<AlignedRow> {
    script
        .ops
        .iter()
        .map(|op| match op {
            EditOp::Keep { old, new, line } => AlignedRow::context(*old, *new, line.clone()),
            EditOp::Delete { old, line } => AlignedRow::removed(*old, line.clone()),
            EditOp::Insert { new, line } => AlignedRow::added(*new, line.clone()),
        })
        .collect()
}

fn align_side_by_side(script: &EditScript) -> Vec<AlignedRow> {
    let mut rows = Vec::with_capacity(script.len());
    let mut removed: Vec<(usize, Line)> = Vec::new();
    let mut added: Vec<(usize, Line)> = Vec::new();

    for op in &script.ops {
        match op {
            EditOp::Keep { old, new, line } => {
                flush_hunk(&mut rows, &mut removed, &mut added);
                rows.push(AlignedRow::context(*old, *new, line.clone()));
            }
            EditOp::Delete { old, line } => removed.push((*old, line.clone())),
            EditOp::Insert { new, line } => added.push((*new, line.clone())),
        }
    }
    flush_hunk(&mut rows, &mut removed, &mut added);

    rows
}

/// Pair the i-th removed line with the i-th added line; the longer side's surplus
/// gets rows of its own.
fn flush_hunk(
    rows: &mut Vec<AlignedRow>,
    removed: &mut Vec<(usize, Line)>,
    added: &mut Vec<(usize, Line)>,
) {
    let mut removed_iter = removed.drain(..);
    let mut added_iter = added.drain(..);

    loop {
        match (removed_iter.next(), added_iter.next()) {
            (Some((old, left)), Some((new, right))) => {
                rows.push(AlignedRow::changed(old, left, new, right))
            }
            (Some((old, left)), None) => rows.push(AlignedRow::removed(old, left)),
            (None, Some((new, right))) => rows.push(AlignedRow::added(new, right)),
            (None, None) => break,
        }
    }
}
