use git2::{DiffFile, DiffFindOptions, FileMode, Oid, Repository, Sort, Tree};
use log::{debug, warn};

use super::operations::{
    commit_from_git, find_rename_source, looks_binary, path_to_git_string, read_blob,
    tree_entry_id,
};
use super::provider::RevisionProvider;
use super::types::{BlobPair, Commit, CommitOrder, LoadError, Target};

/// `RevisionProvider` reading straight from the repository on disk.
#[derive(Debug, Clone, Copy)]
pub struct GitProvider {
    order: CommitOrder,
    follow_renames: bool,
}

impl Default for GitProvider {
    fn default() -> Self {
        Self::new(CommitOrder::default(), true)
    }
}

impl GitProvider {
    pub fn new(order: CommitOrder, follow_renames: bool) -> Self {
        Self {
            order,
            follow_renames,
        }
    }

    pub fn order(&self) -> CommitOrder {
        self.order
    }

    fn open(target: &Target) -> Result<Repository, LoadError> {
        debug!("Opening repository at {:?}", target.repo_root());
        Ok(Repository::open(target.repo_root())?)
    }

    fn walk(repo: &Repository) -> Result<Option<git2::Revwalk<'_>>, LoadError> {
        match repo.head() {
            Ok(_) => {}
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                debug!("Repository has no commits yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.simplify_first_parent()?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
        Ok(Some(revwalk))
    }

    fn file_history(
        &self,
        repo: &Repository,
        path: &str,
        limit: usize,
    ) -> Result<Vec<Commit>, LoadError> {
        let Some(revwalk) = Self::walk(repo)? else {
            return Ok(Vec::new());
        };

        let stop_early = self.order == CommitOrder::NewestFirst;
        let mut current_path = path.to_string();
        let mut commits = Vec::new();

        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            if commit.parent_count() > 1 {
                continue;
            }

            let tree = commit.tree()?;
            let entry = tree_entry_id(&tree, &current_path);
            let parent_tree = first_parent_tree(&commit)?;
            let parent_entry = parent_tree
                .as_ref()
                .and_then(|t| tree_entry_id(t, &current_path));
            if parent_entry == entry {
                continue;
            }

            let mut previous_path = parent_entry.map(|_| current_path.clone());
            if entry.is_none() {
                debug!("{} deleted in {}", current_path, commit.id());
            } else if previous_path.is_none() && self.follow_renames {
                if let Some(parent_tree) = parent_tree.as_ref() {
                    previous_path = find_rename_source(repo, parent_tree, &tree, &current_path)?;
                }
            }

            commits.push(commit_from_git(
                &commit,
                Some(current_path.clone()),
                previous_path.clone(),
            ));

            if let Some(previous) = previous_path {
                current_path = previous;
            }
            if stop_early && commits.len() >= limit {
                break;
            }
        }

        Ok(self.finish(commits, limit))
    }

    fn repository_history(&self, repo: &Repository, limit: usize) -> Result<Vec<Commit>, LoadError> {
        let Some(revwalk) = Self::walk(repo)? else {
            return Ok(Vec::new());
        };

        let stop_early = self.order == CommitOrder::NewestFirst;
        let mut commits = Vec::new();

        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            if commit.parent_count() > 1 {
                continue;
            }
            commits.push(commit_from_git(&commit, None, None));
            if stop_early && commits.len() >= limit {
                break;
            }
        }

        Ok(self.finish(commits, limit))
    }

    /// Apply the ordering policy to a newest-first walk.
    fn finish(&self, mut commits: Vec<Commit>, limit: usize) -> Vec<Commit> {
        if self.order == CommitOrder::OldestFirst {
            commits.reverse();
        }
        commits.truncate(limit);
        commits
    }

    fn file_snapshot(
        repo: &Repository,
        commit: &git2::Commit<'_>,
        path: &str,
        previous_path: &str,
    ) -> Result<BlobPair, LoadError> {
        let tree = commit.tree()?;
        let parent_tree = first_parent_tree(commit)?;

        Ok(BlobPair {
            older: read_blob(repo, parent_tree.as_ref(), previous_path)?,
            newer: read_blob(repo, Some(&tree), path)?,
        })
    }

    fn repository_snapshot(
        &self,
        repo: &Repository,
        commit: &git2::Commit<'_>,
    ) -> Result<BlobPair, LoadError> {
        let tree = commit.tree()?;
        let parent_tree = first_parent_tree(commit)?;

        let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        if self.follow_renames {
            let mut find = DiffFindOptions::new();
            find.renames(true);
            diff.find_similar(Some(&mut find))?;
        }

        let mut pair = BlobPair::default();
        for delta in diff.deltas() {
            let old_file = delta.old_file();
            let new_file = delta.new_file();
            let old_path = old_file
                .path()
                .or_else(|| new_file.path())
                .map(path_to_git_string)
                .unwrap_or_default();
            let new_path = new_file
                .path()
                .or_else(|| old_file.path())
                .map(path_to_git_string)
                .unwrap_or_default();

            let header = format!("diff --git a/{old_path} b/{new_path}\n");
            pair.older.extend_from_slice(header.as_bytes());
            pair.newer.extend_from_slice(header.as_bytes());

            let older = side_contents(repo, &old_file)?;
            let newer = side_contents(repo, &new_file)?;

            if looks_binary(&older) || looks_binary(&newer) {
                debug!("Replacing binary contents of {} with a marker", new_path);
                if !older.is_empty() {
                    append_text(&mut pair.older, format!("Binary file a/{old_path}").as_bytes());
                }
                if !newer.is_empty() {
                    append_text(&mut pair.newer, format!("Binary file b/{new_path}").as_bytes());
                }
                continue;
            }

            append_text(&mut pair.older, &older);
            append_text(&mut pair.newer, &newer);
        }

        Ok(pair)
    }
}

impl RevisionProvider for GitProvider {
    fn list_commits(&self, target: &Target, limit: usize) -> Result<Vec<Commit>, LoadError> {
        debug!("Listing up to {} commits for {}", limit, target);
        let repo = Self::open(target)?;

        let commits = match target.file_path() {
            Some(path) => self.file_history(&repo, path, limit)?,
            None => self.repository_history(&repo, limit)?,
        };

        debug!("Found {} commits for {}", commits.len(), target);
        Ok(commits)
    }

    fn snapshot_pair(&self, target: &Target, commit: &Commit) -> Result<BlobPair, LoadError> {
        debug!("Loading snapshot of {} for {}", commit.short_id, target);
        let repo = Self::open(target)?;

        let oid = Oid::from_str(&commit.id).map_err(|e| {
            warn!("Invalid commit id {}: {}", commit.id, e);
            LoadError::not_found(format!("invalid commit id {}", commit.id))
        })?;
        let git_commit = repo.find_commit(oid)?;

        match target.file_path() {
            Some(target_path) => {
                let path = commit.path.as_deref().unwrap_or(target_path);
                let previous_path = commit.previous_path.as_deref().unwrap_or(path);
                Self::file_snapshot(&repo, &git_commit, path, previous_path)
            }
            None => self.repository_snapshot(&repo, &git_commit),
        }
    }
}

fn first_parent_tree<'r>(commit: &git2::Commit<'r>) -> Result<Option<Tree<'r>>, LoadError> {
    if commit.parent_count() == 0 {
        return Ok(None);
    }
    let parent = commit.parent(0)?;
    Ok(Some(parent.tree()?))
}

fn side_contents(repo: &Repository, file: &DiffFile<'_>) -> Result<Vec<u8>, LoadError> {
    if file.id().is_zero() || file.mode() == FileMode::Commit {
        return Ok(Vec::new());
    }
    let blob = repo.find_blob(file.id())?;
    Ok(blob.content().to_vec())
}

fn append_text(buffer: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    buffer.extend_from_slice(bytes);
    if !bytes.ends_with(b"\n") {
        buffer.push(b'\n');
    }
}
