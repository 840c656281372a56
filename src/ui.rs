use crossterm::event::KeyEvent;
use log::{debug, info};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    widgets::Clear,
};
use std::path::{Path, PathBuf};

use crate::config;
use crate::git::{Target, TargetError, resolve_target};
use crate::navigation::{Notice, NavigationState};
use crate::pane::{AppEvent, PaneId, PaneRegistry};

/// Rows taken by the commit header above the diff.
pub const HEADER_HEIGHT: u16 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn background_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Black,
            Theme::Light => Color::White,
        }
    }

    pub fn foreground_color(&self) -> Color {
        match self {
            Theme::Dark => Color::White,
            Theme::Light => Color::Black,
        }
    }

    pub fn primary_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Yellow,
            Theme::Light => Color::Blue,
        }
    }

    pub fn secondary_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Cyan,
            Theme::Light => Color::Magenta,
        }
    }

    pub fn border_color(&self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn focused_border_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Cyan,
            Theme::Light => Color::Blue,
        }
    }

    pub fn highlight_color(&self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn added_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Green,
            Theme::Light => Color::Rgb(0, 128, 0),
        }
    }

    pub fn removed_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Red,
            Theme::Light => Color::Rgb(176, 0, 0),
        }
    }

    pub fn unchanged_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Gray,
            Theme::Light => Color::DarkGray,
        }
    }

    pub fn line_number_color(&self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn warning_color(&self) -> Color {
        match self {
            Theme::Dark => Color::Yellow,
            Theme::Light => Color::Rgb(160, 100, 0),
        }
    }

    pub fn error_color(&self) -> Color {
        match self {
            Theme::Dark => Color::LightRed,
            Theme::Light => Color::Red,
        }
    }
}

impl From<config::Theme> for Theme {
    fn from(theme: config::Theme) -> Self {
        match theme {
            config::Theme::Dark => Theme::Dark,
            config::Theme::Light => Theme::Light,
        }
    }
}

/// Everything the panes read while drawing, plus the overlays' open/closed state.
#[derive(Debug)]
pub struct App {
    pub nav: NavigationState,
    theme: Theme,
    repo_root: PathBuf,
    launch_cwd: PathBuf,
    pane_registry: PaneRegistry,
}

impl App {
    pub fn new(nav: NavigationState, theme: Theme, repo_root: PathBuf, launch_cwd: PathBuf) -> Self {
        Self {
            nav,
            theme,
            repo_root,
            launch_cwd,
            pane_registry: PaneRegistry::new(theme),
        }
    }

    pub fn get_theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        self.pane_registry.set_theme(self.theme);
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn toggle_help(&mut self) {
        let visible = !self.is_showing_help();
        self.pane_registry.set_visible(&PaneId::Help, visible);
    }

    pub fn is_showing_help(&self) -> bool {
        self.pane_registry.is_visible(&PaneId::Help)
    }

    pub fn open_prompt(&mut self) {
        let initial = self
            .nav
            .target()
            .and_then(|t| t.file_path().map(str::to_string))
            .unwrap_or_default();
        self.pane_registry.with_pane_mut(&PaneId::FilePrompt, |pane| {
            if let Some(prompt) = pane.as_file_prompt_pane_mut() {
                prompt.open(initial);
            }
        });
    }

    pub fn close_prompt(&mut self) {
        self.pane_registry.set_visible(&PaneId::FilePrompt, false);
    }

    pub fn is_prompt_open(&self) -> bool {
        self.pane_registry.is_visible(&PaneId::FilePrompt)
    }

    /// Text typed into the prompt so far, if it is open.
    pub fn prompt_input(&self) -> Option<&str> {
        self.pane_registry
            .get_pane(&PaneId::FilePrompt)
            .filter(|pane| pane.visible())
            .and_then(|pane| pane.as_file_prompt_pane())
            .map(|prompt| prompt.input())
    }

    pub fn forward_key_to_pane(&mut self, id: PaneId, key: KeyEvent) -> bool {
        self.pane_registry
            .with_pane_mut(&id, |pane| pane.handle_event(&AppEvent::Key(key)))
            .unwrap_or(false)
    }

    pub fn take_prompt_submission(&mut self) -> Option<String> {
        self.pane_registry
            .with_pane_mut(&PaneId::FilePrompt, |pane| {
                pane.as_file_prompt_pane_mut()
                    .and_then(|prompt| prompt.take_submission())
            })
            .flatten()
    }

    /// Resolve user input against the launch directory and switch to it.
    /// Empty input cancels; invalid paths become a warning and the view stays.
    pub fn submit_target(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            debug!("Empty file prompt submission, nothing to do");
            return;
        }

        match self.resolve(raw) {
            Ok(target) => {
                if self.nav.target() == Some(&target) && !self.nav.history().is_empty() {
                    debug!("Target {} already shown", target);
                    return;
                }
                info!("User selected {}", target);
                self.nav.retarget(target);
            }
            Err(err) => {
                log::warn!("Rejected target {raw:?}: {err}");
                self.nav.set_notice(Notice::warning(err.to_string()));
            }
        }
    }

    fn resolve(&self, raw: &str) -> Result<Target, TargetError> {
        resolve_target(&self.repo_root, &self.launch_cwd, raw)
    }
}

/// Split the frame into the list, header, diff and status areas.
pub struct AppLayout {
    pub commit_list: Rect,
    pub commit_header: Rect,
    pub diff: Rect,
    pub status_bar: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(rows[0]);

        let detail = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
            .split(columns[1]);

        Self {
            commit_list: columns[0],
            commit_header: detail[0],
            diff: detail[1],
            status_bar: rows[1],
        }
    }

    /// Diff rows that fit inside the diff pane's borders.
    pub fn diff_viewport(&self) -> usize {
        self.diff.height.saturating_sub(2) as usize
    }
}

pub fn render(f: &mut Frame, app: &mut App) {
    let layout = AppLayout::new(f.area());
    app.nav.set_viewport_height(layout.diff_viewport());

    let app: &App = app;
    let registry = &app.pane_registry;
    registry.render(f, app, layout.commit_list, PaneId::CommitList);
    registry.render(f, app, layout.commit_header, PaneId::CommitHeader);
    registry.render(f, app, layout.diff, PaneId::Diff);
    registry.render(f, app, layout.status_bar, PaneId::StatusBar);

    if registry.is_visible(&PaneId::Help) {
        let area = centered_rect(70, 80, f.area());
        f.render_widget(Clear, area);
        registry.render(f, app, area, PaneId::Help);
    }

    if registry.is_visible(&PaneId::FilePrompt) {
        let area = prompt_rect(f.area());
        f.render_widget(Clear, area);
        registry.render(f, app, area, PaneId::FilePrompt);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn prompt_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).min(80);
    let height = 3.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::AlignMode;
    use crate::navigation::{LoadLimits, NoticeLevel, Phase};
    use std::fs;
    use tempfile::TempDir;

    fn app_in(dir: &Path) -> App {
        App::new(
            NavigationState::new(LoadLimits::default(), AlignMode::Inline),
            Theme::Dark,
            dir.to_path_buf(),
            dir.to_path_buf(),
        )
    }

    #[test]
    fn test_layout_viewport_excludes_borders() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.commit_header.height, HEADER_HEIGHT);
        assert_eq!(layout.diff_viewport(), (40 - 1 - HEADER_HEIGHT - 2) as usize);
    }

    #[test]
    fn test_toggle_help() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(dir.path());
        assert!(!app.is_showing_help());
        app.toggle_help();
        assert!(app.is_showing_help());
        app.toggle_help();
        assert!(!app.is_showing_help());
    }

    #[test]
    fn test_submit_missing_file_warns_and_keeps_view() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let mut app = app_in(&root);

        app.submit_target("does-not-exist.txt");

        assert_eq!(app.nav.phase(), Phase::Empty);
        assert!(app.nav.take_commands().is_empty());
        let notice = app.nav.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("does not exist"));
    }

    #[test]
    fn test_submit_existing_file_retargets() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("notes.txt"), "hello\n").unwrap();
        let mut app = app_in(&root);

        app.submit_target("notes.txt");

        assert_eq!(app.nav.phase(), Phase::Retargeting);
        assert_eq!(app.nav.target().and_then(|t| t.file_path()), Some("notes.txt"));
    }

    #[test]
    fn test_submit_dot_selects_repository_mode() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let mut app = app_in(&root);

        app.submit_target(".");

        assert!(app.nav.target().is_some_and(|t| t.is_repository()));
    }

    #[test]
    fn test_empty_submission_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(dir.path());
        app.submit_target("   ");
        assert_eq!(app.nav.phase(), Phase::Empty);
        assert!(app.nav.notice().is_none());
    }

    #[test]
    fn test_theme_conversion() {
        assert_eq!(Theme::from(config::Theme::Light), Theme::Light);
        assert_eq!(Theme::from(config::Theme::Dark), Theme::Dark);
    }
}
