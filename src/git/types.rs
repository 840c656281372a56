use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single commit touching the viewed target.
#[derive(Debug, Clone)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub parent_ids: Vec<String>,
    pub author: String,
    pub author_email: String,
    pub timestamp: DateTime<FixedOffset>,
    pub summary: String,
    pub body: String,
    /// Path of the file in this commit (file history only).
    pub path: Option<String>,
    /// Path of the file in the first parent, differs from `path` after a rename.
    pub previous_path: Option<String>,
}

impl Commit {
    pub fn first_parent(&self) -> Option<&str> {
        self.parent_ids.first().map(String::as_str)
    }

    pub fn was_renamed(&self) -> bool {
        matches!((&self.path, &self.previous_path), (Some(new), Some(old)) if new != old)
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// What the history is being shown for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File { repo_root: PathBuf, path: String },
    Repository { repo_root: PathBuf },
}

impl Target {
    pub fn repo_root(&self) -> &Path {
        match self {
            Target::File { repo_root, .. } | Target::Repository { repo_root } => repo_root,
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        match self {
            Target::File { path, .. } => Some(path),
            Target::Repository { .. } => None,
        }
    }

    pub fn is_repository(&self) -> bool {
        matches!(self, Target::Repository { .. })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::File { path, .. } => write!(f, "{path}"),
            Target::Repository { repo_root } => {
                let name = repo_root
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| repo_root.display().to_string());
                write!(f, "{name} (repository)")
            }
        }
    }
}

/// Ordering policy of a loaded history, fixed when the history is fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Raw contents on both sides of a commit, before text decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobPair {
    pub older: Vec<u8>,
    pub newer: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    NotFound,
    AccessDenied,
    IoFailure,
    Unknown,
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadErrorKind::NotFound => "not found",
            LoadErrorKind::AccessDenied => "access denied",
            LoadErrorKind::IoFailure => "i/o failure",
            LoadErrorKind::Unknown => "error",
        };
        f.write_str(label)
    }
}

/// Failure reported by a revision provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub message: String,
}

impl LoadError {
    pub fn new(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(LoadErrorKind::NotFound, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LoadErrorKind::Unknown, message)
    }
}

impl From<git2::Error> for LoadError {
    fn from(err: git2::Error) -> Self {
        let kind = match (err.code(), err.class()) {
            (git2::ErrorCode::NotFound, _) | (git2::ErrorCode::UnbornBranch, _) => {
                LoadErrorKind::NotFound
            }
            (git2::ErrorCode::Auth, _) | (git2::ErrorCode::Owner, _) => {
                LoadErrorKind::AccessDenied
            }
            (git2::ErrorCode::Locked, _)
            | (_, git2::ErrorClass::Os)
            | (_, git2::ErrorClass::Filesystem)
            | (_, git2::ErrorClass::Odb) => LoadErrorKind::IoFailure,
            _ => LoadErrorKind::Unknown,
        };
        Self::new(kind, err.message().to_string())
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => LoadErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => LoadErrorKind::AccessDenied,
            _ => LoadErrorKind::IoFailure,
        };
        Self::new(kind, err.to_string())
    }
}

/// Problems with a path typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("No file path provided.")]
    Empty,
    #[error("File does not exist: {0}")]
    Missing(PathBuf),
    #[error("Path points to a directory; expected a file: {0}")]
    Directory(PathBuf),
    #[error("{path} is outside repository {repo_root}")]
    OutsideRepository { path: PathBuf, repo_root: PathBuf },
    #[error("Could not locate a git repository for {0}")]
    NoRepository(PathBuf),
}
