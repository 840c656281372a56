//! Session state: the loaded history, the selected commit, focus and scroll.
//!
//! `NavigationState` never does I/O. Keys and retargets queue `LoadCommand`s that
//! the caller drains with `take_commands`, and finished loads come back through
//! `apply`. Every command carries the target generation so results for an old
//! target are recognised and dropped.

pub mod keys;

use crossterm::event::KeyEvent;
use log::{debug, info, warn};
use std::collections::HashMap;

use crate::diff::{AlignMode, AlignedDiff, AlignedRow, DiffCache, DiffView, SharedDiff};
use crate::git::{Commit, LoadError, Target};
use crate::loader::{LoadCommand, LoadEvent};
use crate::pane::KeyResult;

pub use keys::NavAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Ready,
    LoadingMore,
    Retargeting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    List,
    Detail,
}

impl Focus {
    fn toggle(self) -> Self {
        match self {
            Focus::List => Focus::Detail,
            Focus::Detail => Focus::List,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    pub selected_index: usize,
    pub focus: Focus,
    pub scroll_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient message shown in the status bar until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// What the detail pane should show for the selected commit.
#[derive(Debug, Clone)]
pub enum DiffStatus {
    NoCommit,
    Loading,
    Ready(SharedDiff),
    Unavailable(LoadError),
}

/// Load boundary settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    /// Commits requested per fetch beyond what is already loaded.
    pub page_size: usize,
    /// Upper bound on the history length.
    pub max_commits: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            page_size: 64,
            max_commits: 256,
        }
    }
}

/// The view kept aside while a retarget is in flight.
#[derive(Debug)]
struct Fallback {
    target: Option<Target>,
    history: Vec<Commit>,
    cursor: NavigationCursor,
    exhausted: bool,
}

#[derive(Debug)]
pub struct NavigationState {
    phase: Phase,
    target: Option<Target>,
    generation: u64,
    history: Vec<Commit>,
    cursor: NavigationCursor,
    cache: DiffCache,
    pending_diff: Option<usize>,
    failed_diffs: HashMap<usize, LoadError>,
    queued_next: bool,
    exhausted: bool,
    fallback: Option<Fallback>,
    limits: LoadLimits,
    viewport_height: usize,
    mode: AlignMode,
    notice: Option<Notice>,
    outbox: Vec<LoadCommand>,
}

impl NavigationState {
    pub fn new(limits: LoadLimits, mode: AlignMode) -> Self {
        Self {
            phase: Phase::Empty,
            target: None,
            generation: 0,
            history: Vec::new(),
            cursor: NavigationCursor::default(),
            cache: DiffCache::new(),
            pending_diff: None,
            failed_diffs: HashMap::new(),
            queued_next: false,
            exhausted: false,
            fallback: None,
            limits: LoadLimits {
                page_size: limits.page_size.max(1),
                max_commits: limits.max_commits.max(1),
            },
            viewport_height: 0,
            mode,
            notice: None,
            outbox: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &[Commit] {
        &self.history
    }

    pub fn cursor(&self) -> NavigationCursor {
        self.cursor
    }

    pub fn mode(&self) -> AlignMode {
        self.mode
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn current_commit(&self) -> Option<&Commit> {
        self.history.get(self.cursor.selected_index)
    }

    /// 1-based position of the selection and the loaded history length.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current_commit()
            .map(|_| (self.cursor.selected_index + 1, self.history.len()))
    }

    pub fn current_view(&self) -> Option<&DiffView> {
        self.current_commit()?;
        self.cache.view(self.cursor.selected_index)
    }

    pub fn current_aligned(&self) -> Option<&AlignedDiff> {
        match self.current_view()? {
            DiffView::Text(aligned) => Some(aligned),
            DiffView::Unsupported { .. } => None,
        }
    }

    /// Rows of the selected commit's diff in the active display mode.
    pub fn current_rows(&self) -> &[AlignedRow] {
        self.current_view()
            .map(|view| view.rows(self.mode))
            .unwrap_or(&[])
    }

    pub fn current_diff(&self) -> DiffStatus {
        let index = self.cursor.selected_index;
        if self.current_commit().is_none() {
            return DiffStatus::NoCommit;
        }
        if let Some(view) = self.cache.get(index) {
            return DiffStatus::Ready(view);
        }
        match self.failed_diffs.get(&index) {
            Some(err) => DiffStatus::Unavailable(err.clone()),
            None => DiffStatus::Loading,
        }
    }

    /// Commands queued since the last call, in issue order.
    pub fn take_commands(&mut self) -> Vec<LoadCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        if self.viewport_height != height {
            self.viewport_height = height;
            self.clamp_scroll();
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        debug!("Display mode switched to {}", self.mode.label());
        self.clamp_scroll();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        let Some(action) = NavAction::from_key(&key) else {
            return KeyResult::NotHandled;
        };
        self.notice = None;
        self.perform(action);
        KeyResult::Handled
    }

    pub fn perform(&mut self, action: NavAction) {
        match action {
            NavAction::NextCommit => self.next_commit(),
            NavAction::PreviousCommit => self.previous_commit(),
            NavAction::ToggleFocus => self.cursor.focus = self.cursor.focus.toggle(),
            NavAction::Up => match self.cursor.focus {
                Focus::List => self.previous_commit(),
                Focus::Detail => self.scroll_up(1),
            },
            NavAction::Down => match self.cursor.focus {
                Focus::List => self.next_commit(),
                Focus::Detail => self.scroll_down(1),
            },
            NavAction::PageUp => self.scroll_up(self.page_len()),
            NavAction::PageDown => self.scroll_down(self.page_len()),
            NavAction::Home => self.cursor.scroll_offset = 0,
            NavAction::End => self.cursor.scroll_offset = self.max_scroll(),
            NavAction::ToggleMode => self.toggle_mode(),
        }
    }

    /// Switch to a new target. The current view is kept aside until the new
    /// history arrives so a failed load can restore it.
    pub fn retarget(&mut self, target: Target) {
        info!("Retargeting to {}", target);

        self.generation += 1;
        self.outbox.clear();
        self.outbox.push(LoadCommand::CancelAll);

        if !self.history.is_empty() {
            self.fallback = Some(Fallback {
                target: self.target.take(),
                history: std::mem::take(&mut self.history),
                cursor: self.cursor,
                exhausted: self.exhausted,
            });
        }

        self.cache.invalidate_all();
        self.failed_diffs.clear();
        self.pending_diff = None;
        self.queued_next = false;
        self.exhausted = false;
        self.cursor = NavigationCursor::default();
        self.target = Some(target.clone());
        self.phase = Phase::Retargeting;

        let limit = self.limits.page_size.min(self.limits.max_commits);
        self.outbox.push(LoadCommand::History {
            generation: self.generation,
            target,
            limit,
        });
    }

    pub fn apply(&mut self, event: LoadEvent) {
        if event.generation() != self.generation {
            debug!(
                "Dropping result for generation {} (current {})",
                event.generation(),
                self.generation
            );
            return;
        }

        match event {
            LoadEvent::History { limit, result, .. } => self.apply_history(limit, result),
            LoadEvent::Diff {
                index,
                commit_id,
                result,
                ..
            } => self.apply_diff(index, &commit_id, result),
        }
    }

    fn apply_history(&mut self, limit: usize, result: Result<Vec<Commit>, LoadError>) {
        match self.phase {
            Phase::Retargeting => self.finish_retarget(limit, result),
            Phase::LoadingMore => self.finish_load_more(limit, result),
            Phase::Empty | Phase::Ready => {
                debug!("Ignoring history result in phase {:?}", self.phase);
            }
        }
    }

    fn finish_retarget(&mut self, limit: usize, result: Result<Vec<Commit>, LoadError>) {
        let target = self
            .target
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        match result {
            Ok(commits) if !commits.is_empty() => {
                info!("Loaded {} commits for {}", commits.len(), target);
                self.exhausted = self.is_final_fetch(limit, commits.len());
                self.history = dedup(commits);
                self.fallback = None;
                self.cursor = NavigationCursor::default();
                self.phase = Phase::Ready;
                self.notice = Some(Notice::info(format!("Loaded {target}")));
                self.ensure_diff();
            }
            Ok(_) => {
                warn!("No commits found for {}", target);
                self.restore_fallback(Notice::warning(format!("No commits found for {target}")));
            }
            Err(err) => {
                warn!("Failed to load history for {}: {}", target, err);
                self.restore_fallback(Notice::error(format!(
                    "Failed to load history for {target}: {err}"
                )));
            }
        }
    }

    fn restore_fallback(&mut self, notice: Notice) {
        self.notice = Some(notice);

        match self.fallback.take() {
            Some(fallback) => {
                debug!("Restoring previous view");
                self.target = fallback.target;
                self.history = fallback.history;
                self.cursor = fallback.cursor;
                self.exhausted = fallback.exhausted;
                self.phase = Phase::Ready;
                self.clamp_scroll();
                self.ensure_diff();
            }
            None => {
                self.phase = Phase::Empty;
            }
        }
    }

    fn finish_load_more(&mut self, limit: usize, result: Result<Vec<Commit>, LoadError>) {
        self.phase = Phase::Ready;
        let advance = std::mem::take(&mut self.queued_next);

        match result {
            Ok(commits) => {
                let fetched = commits.len();
                let added = self.merge(commits);
                debug!("Load more fetched {} commits, {} new", fetched, added);

                self.exhausted = added == 0 || self.is_final_fetch(limit, fetched);
                if advance {
                    self.select(self.cursor.selected_index + 1);
                }
            }
            Err(err) => {
                warn!("Failed to load more history: {}", err);
                self.notice = Some(Notice::warning(format!("Could not load more commits: {err}")));
            }
        }
    }

    fn apply_diff(&mut self, index: usize, commit_id: &str, result: Result<SharedDiff, LoadError>) {
        if self.history.get(index).map(|c| c.id.as_str()) != Some(commit_id) {
            debug!("Dropping diff for {} at #{}: history moved on", commit_id, index);
            return;
        }
        if self.pending_diff == Some(index) {
            self.pending_diff = None;
        }

        match result {
            Ok(view) => {
                self.failed_diffs.remove(&index);
                self.cache.insert(index, view);
                if index == self.cursor.selected_index {
                    self.clamp_scroll();
                }
            }
            Err(err) => {
                warn!("Diff for commit #{} unavailable: {}", index, err);
                self.notice = Some(Notice::warning(format!("Diff unavailable: {err}")));
                self.failed_diffs.insert(index, err);
            }
        }
    }

    fn next_commit(&mut self) {
        if self.history.is_empty() || self.phase == Phase::Retargeting {
            return;
        }

        let next = self.cursor.selected_index + 1;
        if next < self.history.len() {
            self.select(next);
            return;
        }

        match self.phase {
            Phase::Ready if self.may_have_more() => {
                let limit = (self.history.len() + self.limits.page_size).min(self.limits.max_commits);
                debug!("Reached end of loaded history, requesting {} commits", limit);
                self.queued_next = true;
                self.phase = Phase::LoadingMore;
                if let Some(target) = self.target.clone() {
                    self.outbox.push(LoadCommand::History {
                        generation: self.generation,
                        target,
                        limit,
                    });
                }
            }
            _ => {}
        }
    }

    fn previous_commit(&mut self) {
        if self.history.is_empty() || self.phase == Phase::Retargeting {
            return;
        }
        self.queued_next = false;
        let previous = self.cursor.selected_index.saturating_sub(1);
        self.select(previous);
    }

    fn select(&mut self, index: usize) {
        if self.history.is_empty() {
            return;
        }
        let index = index.min(self.history.len() - 1);
        if index != self.cursor.selected_index {
            self.cursor.selected_index = index;
            self.cursor.scroll_offset = 0;
        }
        self.ensure_diff();
    }

    /// Queue a diff load for the selection unless it is cached or already pending.
    fn ensure_diff(&mut self) {
        let index = self.cursor.selected_index;
        let Some(commit) = self.history.get(index) else {
            return;
        };
        if self.cache.contains(index) || self.pending_diff == Some(index) {
            return;
        }
        let Some(target) = self.target.clone() else {
            return;
        };

        self.failed_diffs.remove(&index);
        self.pending_diff = Some(index);
        self.outbox.push(LoadCommand::Diff {
            generation: self.generation,
            target,
            index,
            commit: commit.clone(),
        });
    }

    fn merge(&mut self, commits: Vec<Commit>) -> usize {
        let before = self.history.len();
        for commit in commits {
            if !self.history.iter().any(|c| c.id == commit.id) {
                self.history.push(commit);
            }
        }
        self.history.len() - before
    }

    fn may_have_more(&self) -> bool {
        !self.exhausted && self.history.len() < self.limits.max_commits
    }

    fn is_final_fetch(&self, limit: usize, fetched: usize) -> bool {
        fetched < limit || limit >= self.limits.max_commits
    }

    fn page_len(&self) -> usize {
        self.viewport_height.max(1)
    }

    fn max_scroll(&self) -> usize {
        self.current_rows().len().saturating_sub(self.viewport_height)
    }

    fn scroll_down(&mut self, lines: usize) {
        self.cursor.scroll_offset = (self.cursor.scroll_offset + lines).min(self.max_scroll());
    }

    fn scroll_up(&mut self, lines: usize) {
        self.cursor.scroll_offset = self.cursor.scroll_offset.saturating_sub(lines);
    }

    fn clamp_scroll(&mut self) {
        self.cursor.scroll_offset = self.cursor.scroll_offset.min(self.max_scroll());
    }
}

fn dedup(commits: Vec<Commit>) -> Vec<Commit> {
    let mut unique: Vec<Commit> = Vec::with_capacity(commits.len());
    for commit in commits {
        if !unique.iter().any(|c| c.id == commit.id) {
            unique.push(commit);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{DiffView, RevisionPair};
    use chrono::{FixedOffset, TimeZone};
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn commit(n: usize) -> Commit {
        Commit {
            id: format!("{n:040x}"),
            short_id: format!("{n:07x}"),
            parent_ids: vec![],
            author: "Test User".to_string(),
            author_email: "test@example.com".to_string(),
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .unwrap(),
            summary: format!("commit {n}"),
            body: String::new(),
            path: Some("file.txt".to_string()),
            previous_path: Some("file.txt".to_string()),
        }
    }

    fn target(path: &str) -> Target {
        Target::File {
            repo_root: PathBuf::from("/repo"),
            path: path.to_string(),
        }
    }

    fn view(rows: usize) -> SharedDiff {
        let newer = (0..rows).map(|i| Arc::from(format!("line {i}").as_str())).collect();
        Arc::new(DiffView::build(&RevisionPair::new(Vec::new(), newer)))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded(count: usize, limits: LoadLimits) -> NavigationState {
        let mut nav = NavigationState::new(limits, AlignMode::Inline);
        nav.retarget(target("file.txt"));
        let generation = nav.generation();
        let limit = limits.page_size.min(limits.max_commits);
        nav.apply(LoadEvent::History {
            generation,
            limit,
            result: Ok((0..count).map(commit).collect()),
        });
        nav.take_commands();
        nav
    }

    #[test]
    fn test_initial_load_selects_first_commit() {
        let mut nav = NavigationState::new(LoadLimits::default(), AlignMode::Inline);
        nav.retarget(target("file.txt"));
        assert_eq!(nav.phase(), Phase::Retargeting);

        let commands = nav.take_commands();
        assert_eq!(commands[0], LoadCommand::CancelAll);
        assert!(matches!(commands[1], LoadCommand::History { limit: 64, .. }));

        nav.apply(LoadEvent::History {
            generation: nav.generation(),
            limit: 64,
            result: Ok(vec![commit(0), commit(1)]),
        });

        assert_eq!(nav.phase(), Phase::Ready);
        assert_eq!(nav.cursor(), NavigationCursor::default());
        assert!(nav.is_exhausted());
        let commands = nav.take_commands();
        assert!(matches!(commands.as_slice(), [LoadCommand::Diff { index: 0, .. }]));
        assert!(matches!(nav.current_diff(), DiffStatus::Loading));
    }

    #[test]
    fn test_initial_load_without_commits_stays_empty() {
        let mut nav = NavigationState::new(LoadLimits::default(), AlignMode::Inline);
        nav.retarget(target("file.txt"));
        nav.apply(LoadEvent::History {
            generation: nav.generation(),
            limit: 64,
            result: Ok(vec![]),
        });
        assert_eq!(nav.phase(), Phase::Empty);
        assert_eq!(nav.notice().map(|n| n.level), Some(NoticeLevel::Warning));
        assert!(matches!(nav.current_diff(), DiffStatus::NoCommit));
    }

    #[test]
    fn test_selection_clamps_when_exhausted() {
        let mut nav = loaded(3, LoadLimits::default());

        nav.handle_key(key(KeyCode::Left));
        assert_eq!(nav.cursor().selected_index, 0);

        for _ in 0..5 {
            nav.handle_key(key(KeyCode::Right));
        }
        assert_eq!(nav.cursor().selected_index, 2);
        assert_eq!(nav.phase(), Phase::Ready);
    }

    #[test]
    fn test_scroll_resets_on_selection_change() {
        let mut nav = loaded(3, LoadLimits::default());
        nav.set_viewport_height(5);
        let generation = nav.generation();
        let id = nav.current_commit().unwrap().id.clone();
        nav.apply(LoadEvent::Diff {
            generation,
            index: 0,
            commit_id: id,
            result: Ok(view(20)),
        });

        nav.handle_key(key(KeyCode::Tab));
        nav.handle_key(key(KeyCode::PageDown));
        assert_eq!(nav.cursor().scroll_offset, 5);
        assert_eq!(nav.cursor().focus, Focus::Detail);

        nav.handle_key(key(KeyCode::Char('n')));
        assert_eq!(nav.cursor().selected_index, 1);
        assert_eq!(nav.cursor().scroll_offset, 0);
        assert_eq!(nav.cursor().focus, Focus::Detail);
    }

    #[test]
    fn test_end_clamps_to_rows() {
        let mut nav = loaded(1, LoadLimits::default());
        nav.set_viewport_height(10);
        let generation = nav.generation();
        let id = nav.current_commit().unwrap().id.clone();
        nav.apply(LoadEvent::Diff {
            generation,
            index: 0,
            commit_id: id,
            result: Ok(view(3)),
        });

        nav.handle_key(key(KeyCode::End));
        assert_eq!(nav.cursor().scroll_offset, 0);
    }

    #[test]
    fn test_list_focus_moves_selection_detail_focus_scrolls() {
        let mut nav = loaded(3, LoadLimits::default());
        nav.set_viewport_height(2);
        let generation = nav.generation();
        let id = nav.current_commit().unwrap().id.clone();
        nav.apply(LoadEvent::Diff {
            generation,
            index: 0,
            commit_id: id,
            result: Ok(view(6)),
        });

        nav.handle_key(key(KeyCode::Char('j')));
        assert_eq!(nav.cursor().selected_index, 1);
        nav.handle_key(key(KeyCode::Char('k')));
        assert_eq!(nav.cursor().selected_index, 0);

        nav.handle_key(key(KeyCode::Tab));
        nav.handle_key(key(KeyCode::Char('j')));
        assert_eq!(nav.cursor().selected_index, 0);
        assert_eq!(nav.cursor().scroll_offset, 1);
    }

    #[test]
    fn test_mode_toggle_reclamps_scroll() {
        let mut nav = loaded(1, LoadLimits::default());
        nav.set_viewport_height(1);
        let generation = nav.generation();
        let id = nav.current_commit().unwrap().id.clone();
        let pair = RevisionPair::new(
            vec![Arc::from("a"), Arc::from("b")],
            vec![Arc::from("x"), Arc::from("y")],
        );
        nav.apply(LoadEvent::Diff {
            generation,
            index: 0,
            commit_id: id,
            result: Ok(Arc::new(DiffView::build(&pair))),
        });

        nav.handle_key(key(KeyCode::End));
        assert_eq!(nav.cursor().scroll_offset, 3);

        nav.handle_key(key(KeyCode::Char('m')));
        assert_eq!(nav.mode(), AlignMode::SideBySide);
        assert_eq!(nav.cursor().scroll_offset, 1);
    }

    #[test]
    fn test_unknown_key_is_not_handled() {
        let mut nav = loaded(1, LoadLimits::default());
        assert!(matches!(nav.handle_key(key(KeyCode::Char('z'))), KeyResult::NotHandled));
    }
}
