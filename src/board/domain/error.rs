//! Error types for board domain validation, value resolution and per-item
//! operations.

use super::FieldKind;
use thiserror::Error;

/// Errors returned while constructing board domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// An identifier is empty after trimming.
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier {
        /// Kind of identifier that was rejected.
        kind: &'static str,
    },

    /// The field kind reported by the remote board is not modelled.
    #[error("unknown field kind: {0}")]
    UnknownFieldKind(String),

    /// Options were supplied for a field that is not single-select.
    #[error("field '{field}' of kind {kind} cannot carry options")]
    OptionsOnNonSelectField {
        /// Field name.
        field: String,
        /// Declared field kind.
        kind: FieldKind,
    },

    /// The issue URL does not name a GitHub issue or pull request.
    #[error(
        "invalid issue URL '{0}', expected https://github.com/<owner>/<repo>/issues/<number>"
    )]
    InvalidIssueUrl(String),
}

/// Errors returned while resolving a human-readable target against a board
/// schema.
///
/// Every variant is fatal for a whole batch: the target is unreachable for
/// every item, so no mutation is attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// No field on the board matches the requested name.
    #[error(
        "field '{field_name}' not found on board (available: {})",
        available_fields.join(", ")
    )]
    FieldNotFound {
        /// Requested field name.
        field_name: String,
        /// Names of every field on the board, in board order.
        available_fields: Vec<String>,
    },

    /// The raw value cannot be expressed in the field's type.
    #[error("{}", describe_invalid_value(field_name, raw_value, reason, available_options))]
    InvalidValue {
        /// Field the value was resolved against.
        field_name: String,
        /// Value exactly as the caller supplied it.
        raw_value: String,
        /// Why the value was rejected.
        reason: String,
        /// Valid option names for single-select fields; empty otherwise.
        available_options: Vec<String>,
    },

    /// The field exists but cannot be written.
    #[error("field '{field_name}' of kind {kind} cannot be updated")]
    UnsupportedField {
        /// Field name as known by the board.
        field_name: String,
        /// Field kind.
        kind: FieldKind,
    },
}

fn describe_invalid_value(
    field_name: &str,
    raw_value: &str,
    reason: &str,
    available_options: &[String],
) -> String {
    if available_options.is_empty() {
        format!("invalid value '{raw_value}' for field '{field_name}': {reason}")
    } else {
        format!(
            "invalid value '{raw_value}' for field '{field_name}': {reason} (available: {})",
            available_options.join(", ")
        )
    }
}

/// Failure of one remote operation for one item.
///
/// Recorded in a batch outcome instead of aborting the batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    /// The caller lacks permission for the operation.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// The item, field or issue does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation kept failing transiently until the retry budget ran out.
    #[error("transient failure after {attempts} attempt(s): {cause}")]
    Transient {
        /// Attempts made, including the first.
        attempts: u32,
        /// Last underlying failure.
        cause: String,
    },

    /// The remote system rejected the request outright.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The batch was cancelled before this operation completed.
    #[error("cancelled")]
    Cancelled,
}

impl OperationError {
    /// Returns `true` for cancellation outcomes.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
