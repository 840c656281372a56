//! Thin helpers over the git2 crate shared by the revision provider and target resolution.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{DiffFindOptions, Oid, Repository, Tree};
use log::debug;
use std::path::{Component, Path, PathBuf};

use super::types::{Commit, LoadError, Target, TargetError};

/// Number of leading bytes inspected when sniffing for binary content (same as git).
pub const BINARY_SNIFF_LEN: usize = 8000;

/// Locate the working directory of the repository containing `start`.
pub fn discover_repo_root(start: &Path) -> Result<PathBuf, TargetError> {
    debug!("Discovering git repository from {:?}", start);

    let repo = Repository::discover(start)
        .map_err(|_| TargetError::NoRepository(start.to_path_buf()))?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| TargetError::NoRepository(start.to_path_buf()))?;

    let root = normalize(workdir);
    debug!("Repository discovered at: {:?}", root);
    Ok(root)
}

/// Turn user input into a history target inside `repo_root`.
///
/// Relative input is resolved against `launch_cwd`. The repository root itself
/// (or `.` when launched from it) selects repository-wide history.
pub fn resolve_target(
    repo_root: &Path,
    launch_cwd: &Path,
    raw: &str,
) -> Result<Target, TargetError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TargetError::Empty);
    }

    let candidate = Path::new(trimmed);
    let absolute = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        launch_cwd.join(candidate)
    };

    if !absolute.exists() {
        return Err(TargetError::Missing(lexical_normalize(&absolute)));
    }

    let absolute = normalize(&absolute);
    let repo_root = normalize(repo_root);

    if absolute == repo_root {
        return Ok(Target::Repository { repo_root });
    }
    if absolute.is_dir() {
        return Err(TargetError::Directory(absolute));
    }

    let relative = to_repo_relative_path(&repo_root, &absolute).ok_or_else(|| {
        TargetError::OutsideRepository {
            path: absolute.clone(),
            repo_root: repo_root.clone(),
        }
    })?;

    debug!("Resolved {:?} to repo path {}", trimmed, relative);
    Ok(Target::File {
        repo_root,
        path: relative,
    })
}

/// Repository-relative, `/`-separated form of `absolute`, or `None` when it lies outside.
pub fn to_repo_relative_path(repo_root: &Path, absolute: &Path) -> Option<String> {
    let relative = absolute.strip_prefix(repo_root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize()
        .unwrap_or_else(|_| lexical_normalize(path))
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Object id of the entry at `path` in `tree`, if any.
pub fn tree_entry_id(tree: &Tree<'_>, path: &str) -> Option<Oid> {
    tree.get_path(Path::new(path)).ok().map(|entry| entry.id())
}

/// Contents of the blob at `path` in `tree`; an absent path reads as empty.
pub fn read_blob(repo: &Repository, tree: Option<&Tree<'_>>, path: &str) -> Result<Vec<u8>, LoadError> {
    let Some(tree) = tree else {
        return Ok(Vec::new());
    };
    let Some(oid) = tree_entry_id(tree, path) else {
        return Ok(Vec::new());
    };
    let blob = repo.find_blob(oid)?;
    Ok(blob.content().to_vec())
}

/// Where `path` came from if it was renamed between `parent` and `tree`.
pub fn find_rename_source(
    repo: &Repository,
    parent: &Tree<'_>,
    tree: &Tree<'_>,
    path: &str,
) -> Result<Option<String>, LoadError> {
    let mut diff = repo.diff_tree_to_tree(Some(parent), Some(tree), None)?;
    let mut find = DiffFindOptions::new();
    find.renames(true);
    diff.find_similar(Some(&mut find))?;

    for delta in diff.deltas() {
        if delta.status() != git2::Delta::Renamed {
            continue;
        }
        let new_path = delta.new_file().path().map(path_to_git_string);
        if new_path.as_deref() == Some(path) {
            let old_path = delta.old_file().path().map(path_to_git_string);
            debug!("Followed rename {:?} -> {}", old_path, path);
            return Ok(old_path);
        }
    }
    Ok(None)
}

pub fn path_to_git_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Git's heuristic: a NUL byte near the start means binary.
pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|b| *b == 0)
}

/// Build the core commit record from a git2 commit.
pub fn commit_from_git(
    commit: &git2::Commit<'_>,
    path: Option<String>,
    previous_path: Option<String>,
) -> Commit {
    let id = commit.id().to_string();
    let short_id = id.chars().take(7).collect::<String>();
    let author = commit.author();
    let message = commit.message().unwrap_or("");
    let (summary, body) = split_message(message);

    Commit {
        short_id,
        parent_ids: commit.parent_ids().map(|oid| oid.to_string()).collect(),
        author: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        timestamp: git_time_to_datetime(commit.time()),
        summary,
        body,
        path,
        previous_path,
        id,
    }
}

fn split_message(message: &str) -> (String, String) {
    let mut lines = message.lines();
    let summary = lines.next().unwrap_or("").trim().to_string();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    (summary, body)
}

fn git_time_to_datetime(time: git2::Time) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or(Utc.fix());
    DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&offset)
}
