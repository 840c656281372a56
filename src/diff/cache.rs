use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::view::{DiffView, RevisionPair, SharedDiff};

/// Aligned diffs keyed by commit index in the loaded history.
///
/// Entries are only dropped by `invalidate_all`, which happens when the target changes.
#[derive(Debug, Default)]
pub struct DiffCache {
    entries: HashMap<usize, SharedDiff>,
}

impl DiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached view for `index`, computing it from `supplier` on a miss.
    pub fn get_or_compute<F>(&mut self, index: usize, supplier: F) -> SharedDiff
    where
        F: FnOnce() -> RevisionPair,
    {
        self.entries
            .entry(index)
            .or_insert_with(|| {
                debug!("Diff cache miss for commit #{}", index);
                Arc::new(DiffView::build(&supplier()))
            })
            .clone()
    }

    /// Store a view computed elsewhere.
    pub fn insert(&mut self, index: usize, view: SharedDiff) {
        self.entries.insert(index, view);
    }

    pub fn get(&self, index: usize) -> Option<SharedDiff> {
        self.entries.get(&index).cloned()
    }

    /// Borrowing variant of `get` for renderers.
    pub fn view(&self, index: usize) -> Option<&DiffView> {
        self.entries.get(&index).map(|view| view.as_ref())
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn invalidate_all(&mut self) {
        debug!("Invalidating {} cached diffs", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
