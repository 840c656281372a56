use super::types::{BlobPair, Commit, LoadError, Target};

/// Source of commit metadata and revision contents.
///
/// Implementations are called from blocking worker threads, never from the UI task.
pub trait RevisionProvider: Send + Sync {
    /// Commits touching `target`, ordered per the provider's `CommitOrder`, at most `limit`.
    fn list_commits(&self, target: &Target, limit: usize) -> Result<Vec<Commit>, LoadError>;

    /// Contents before (first parent) and after `commit`.
    fn snapshot_pair(&self, target: &Target, commit: &Commit) -> Result<BlobPair, LoadError>;
}
