// Library interface for ghist (git file history browser)
// This exposes modules for integration testing

pub mod config;
pub mod diff;
pub mod git;
pub mod loader;
pub mod logging;
pub mod navigation;
pub mod pane;
pub mod ui;

// Re-export commonly used types for easier testing
pub use diff::{AlignMode, AlignedRow, DiffCache, DiffView, EditOp, EditScript, RowKind};
pub use git::{Commit, GitProvider, LoadError, LoadErrorKind, RevisionProvider, Target};
pub use loader::{LoadCommand, LoadCoordinator, LoadEvent};
pub use navigation::{NavigationState, Phase};
pub use ui::{App, Theme};
