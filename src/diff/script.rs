use std::sync::Arc;

/// One line of text shared between the edit script and the aligned rows.
pub type Line = Arc<str>;

/// A single edit operation; indices are 0-based positions in the older/newer sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Keep { old: usize, new: usize, line: Line },
    Delete { old: usize, line: Line },
    Insert { new: usize, line: Line },
}

impl EditOp {
    pub fn line(&self) -> &Line {
        match self {
            EditOp::Keep { line, .. } | EditOp::Delete { line, .. } | EditOp::Insert { line, .. } => {
                line
            }
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, EditOp::Keep { .. })
    }
}

/// Ordered edit operations turning the older sequence into the newer one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    pub ops: Vec<EditOp>,
}

impl EditScript {
    pub fn new(ops: Vec<EditOp>) -> Self {
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Insert { .. }))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Delete { .. }))
            .count()
    }

    /// Lines of the older revision (Keep and Delete ops).
    pub fn replay_older(&self) -> Vec<Line> {
        self.ops
            .iter()
            .filter(|op| !matches!(op, EditOp::Insert { .. }))
            .map(|op| op.line().clone())
            .collect()
    }

    /// Lines of the newer revision (Keep and Insert ops).
    pub fn replay_newer(&self) -> Vec<Line> {
        self.ops
            .iter()
            .filter(|op| !matches!(op, EditOp::Delete { .. }))
            .map(|op| op.line().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(s: &str) -> Line {
        Arc::from(s)
    }

    #[test]
    fn test_replay_and_counts() {
        let script = EditScript::new(vec![
            EditOp::Keep { old: 0, new: 0, line: line("a") },
            EditOp::Delete { old: 1, line: line("b") },
            EditOp::Insert { new: 1, line: line("x") },
            EditOp::Insert { new: 2, line: line("y") },
        ]);

        assert_eq!(script.replay_older(), vec![line("a"), line("b")]);
        assert_eq!(script.replay_newer(), vec![line("a"), line("x"), line("y")]);
        assert_eq!(script.additions(), 2);
        assert_eq!(script.deletions(), 1);
        assert_eq!(script.len(), 4);
    }

    #[test]
    fn test_empty_script() {
        let script = EditScript::default();
        assert!(script.is_empty());
        assert!(script.replay_older().is_empty());
        assert!(script.replay_newer().is_empty());
    }
}
