pub mod align;
pub mod cache;
pub mod myers;
pub mod script;
#[cfg(test)]
pub(crate) mod testing;
pub mod view;

pub use align::{AlignMode, AlignedRow, RowKind, align};
pub use cache::DiffCache;
pub use myers::diff;
pub use script::{EditOp, EditScript, Line};
pub use view::{AlignedDiff, AlignmentError, DiffView, RevisionPair, SharedDiff};
