use std::collections::HashMap;

use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::ui::{App, Theme};

// Module declarations
mod commit_header_pane;
mod commit_list_pane;
mod diff_pane;
mod file_prompt_pane;
mod help_pane;
mod keys;
mod status_bar_pane;

// Re-exports to maintain public API
pub use commit_header_pane::*;
pub use commit_list_pane::*;
pub use diff_pane::*;
pub use file_prompt_pane::*;
pub use help_pane::*;
pub use keys::*;
pub use status_bar_pane::*;

// Core trait that all panes implement
pub trait Pane {
    fn title(&self) -> String;
    fn render(&self, f: &mut Frame, app: &App, area: Rect)
    -> Result<(), Box<dyn std::error::Error>>;
    fn handle_event(&mut self, event: &AppEvent) -> bool;
    fn visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn as_file_prompt_pane(&self) -> Option<&FilePromptPane> {
        None
    }
    fn as_file_prompt_pane_mut(&mut self) -> Option<&mut FilePromptPane> {
        None
    }
}

// Shared enums and types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    CommitList,
    CommitHeader,
    Diff,
    StatusBar,
    Help,
    FilePrompt,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    ThemeChanged(Theme),
}

// PaneRegistry - Central registry for managing panes
pub struct PaneRegistry {
    panes: HashMap<PaneId, Box<dyn Pane>>,
    theme: Theme,
}

impl std::fmt::Debug for PaneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaneRegistry")
            .field("pane_count", &self.panes.len())
            .field("theme", &self.theme)
            .finish()
    }
}

impl PaneRegistry {
    pub fn new(theme: Theme) -> Self {
        let mut registry = Self {
            panes: HashMap::new(),
            theme,
        };

        registry.register_default_panes();
        registry
    }

    fn register_default_panes(&mut self) {
        self.register_pane(PaneId::CommitList, Box::new(CommitListPane::new()));
        self.register_pane(PaneId::CommitHeader, Box::new(CommitHeaderPane::new()));
        self.register_pane(PaneId::Diff, Box::new(DiffPane::new()));
        self.register_pane(PaneId::StatusBar, Box::new(StatusBarPane::new()));
        self.register_pane(PaneId::Help, Box::new(HelpPane::new()));
        self.register_pane(PaneId::FilePrompt, Box::new(FilePromptPane::new()));
    }

    pub fn register_pane(&mut self, id: PaneId, pane: Box<dyn Pane>) {
        self.panes.insert(id, pane);
    }

    pub fn get_pane(&self, id: &PaneId) -> Option<&dyn Pane> {
        self.panes.get(id).map(|p| p.as_ref())
    }

    pub fn with_pane_mut<F, R>(&mut self, id: &PaneId, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn Pane) -> R,
    {
        self.panes.get_mut(id).map(|p| f(p.as_mut()))
    }

    pub fn is_visible(&self, id: &PaneId) -> bool {
        self.get_pane(id).is_some_and(|p| p.visible())
    }

    pub fn set_visible(&mut self, id: &PaneId, visible: bool) {
        self.with_pane_mut(id, |p| p.set_visible(visible));
    }

    pub fn render(&self, f: &mut Frame, app: &App, area: Rect, pane_id: PaneId) {
        let Some(pane) = self.get_pane(&pane_id) else {
            return;
        };
        if !pane.visible() {
            return;
        }
        if let Err(e) = pane.render(f, app, area) {
            log::error!("Error rendering pane {pane_id:?}: {e}");
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        // Notify all panes of theme change
        let event = AppEvent::ThemeChanged(theme);
        for pane in self.panes.values_mut() {
            let _ = pane.handle_event(&event);
        }
    }
}
