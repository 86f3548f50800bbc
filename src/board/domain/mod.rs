//! Domain model for project board moves.
//!
//! The board domain models schema snapshots, typed field values, item
//! references and per-item batch outcomes while keeping every remote concern
//! behind the port boundary.

mod error;
mod ids;
mod item;
mod outcome;
mod resolver;
mod schema;
mod value;

pub use error::{BoardDomainError, OperationError, ResolutionError};
pub use ids::{BoardId, CommentId, FieldId, ItemId, OptionId};
pub use item::{BoardItem, IssueUrl, ItemRef};
pub use outcome::{BatchOutcome, BatchReport, BatchRunId};
pub use resolver::{ResolvedFieldValue, resolve};
pub use schema::{BoardSchema, FieldDescriptor, FieldKind, OptionDescriptor, STATUS_FIELD};
pub use value::TypedValue;

/// Compares two board names the way the remote board does for lookups:
/// exact text, ignoring case.
#[must_use]
pub fn names_match(left: &str, right: &str) -> bool {
    left == right || left.to_lowercase() == right.to_lowercase()
}
