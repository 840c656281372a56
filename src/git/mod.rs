pub mod operations;
pub mod provider;
pub mod repository;
pub mod types;

pub use operations::{discover_repo_root, resolve_target};
pub use provider::RevisionProvider;
pub use repository::GitProvider;
pub use types::*;
