//! Per-item outcomes and the report of one batch run.

use super::{BoardId, CommentId, ItemId, OperationError};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Identifier of one orchestration run, used to correlate logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchRunId(Uuid);

impl BatchRunId {
    /// Creates a new random run identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for BatchRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of the update and the optional audit comment for one item.
///
/// The two halves are independent: a failed comment never invalidates a
/// successful update. A comment is only attempted after a successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    item_id: ItemId,
    update: Result<(), OperationError>,
    comment: Option<Result<CommentId, OperationError>>,
}

impl BatchOutcome {
    /// Records a successful update with no comment attempted yet.
    #[must_use]
    pub const fn updated(item_id: ItemId) -> Self {
        Self {
            item_id,
            update: Ok(()),
            comment: None,
        }
    }

    /// Records a failed update.
    #[must_use]
    pub const fn update_failed(item_id: ItemId, error: OperationError) -> Self {
        Self {
            item_id,
            update: Err(error),
            comment: None,
        }
    }

    /// Records an item that was never started because the batch was
    /// cancelled.
    #[must_use]
    pub const fn cancelled(item_id: ItemId) -> Self {
        Self::update_failed(item_id, OperationError::Cancelled)
    }

    /// Records the result of the audit comment.
    ///
    /// Ignored when the update failed, since no comment is attempted then.
    #[must_use]
    pub fn with_comment(mut self, result: Result<CommentId, OperationError>) -> Self {
        if self.update.is_ok() {
            self.comment = Some(result);
        }
        self
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// Returns `true` when the field update succeeded.
    #[must_use]
    pub const fn update_succeeded(&self) -> bool {
        self.update.is_ok()
    }

    /// Returns the update failure, if any.
    #[must_use]
    pub const fn update_error(&self) -> Option<&OperationError> {
        match &self.update {
            Ok(()) => None,
            Err(error) => Some(error),
        }
    }

    /// Returns `true` when an audit comment was attempted.
    #[must_use]
    pub const fn comment_attempted(&self) -> bool {
        self.comment.is_some()
    }

    /// Returns `true` when an audit comment was posted.
    #[must_use]
    pub const fn comment_succeeded(&self) -> bool {
        matches!(self.comment, Some(Ok(_)))
    }

    /// Returns the posted comment's identifier.
    #[must_use]
    pub const fn comment_id(&self) -> Option<CommentId> {
        match &self.comment {
            Some(Ok(id)) => Some(*id),
            _ => None,
        }
    }

    /// Returns the comment failure, if any.
    #[must_use]
    pub const fn comment_error(&self) -> Option<&OperationError> {
        match &self.comment {
            Some(Err(error)) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.update {
            Ok(()) => write!(f, "ok      {} updated", self.item_id)?,
            Err(error) => return write!(f, "FAILED  {} update failed: {error}", self.item_id),
        }
        match &self.comment {
            None => Ok(()),
            Some(Ok(id)) => write!(f, ", comment {id} posted"),
            Some(Err(error)) => write!(f, ", comment failed: {error}"),
        }
    }
}

/// Report of one batch run: one outcome per requested item, in request
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    run_id: BatchRunId,
    board_id: BoardId,
    field_name: String,
    target_value: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    /// Assembles a report.
    #[must_use]
    pub const fn new(
        run_id: BatchRunId,
        board_id: BoardId,
        field_name: String,
        target_value: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        outcomes: Vec<BatchOutcome>,
    ) -> Self {
        Self {
            run_id,
            board_id,
            field_name,
            target_value,
            started_at,
            finished_at,
            outcomes,
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> BatchRunId {
        self.run_id
    }

    /// Returns the board the batch ran against.
    #[must_use]
    pub const fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// Returns the field name as the board spells it.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the requested target value.
    #[must_use]
    pub fn target_value(&self) -> &str {
        &self.target_value
    }

    /// Returns when the run started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the run finished.
    #[must_use]
    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Returns the outcomes in request order.
    #[must_use]
    pub fn outcomes(&self) -> &[BatchOutcome] {
        &self.outcomes
    }

    /// Consumes the report, returning the outcomes.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<BatchOutcome> {
        self.outcomes
    }

    /// Returns the number of items whose update succeeded.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.update_succeeded())
            .count()
    }

    /// Returns the number of items whose update failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    /// Returns `true` when the batch was non-empty and no item was updated.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded_count() == 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Moved {}/{} item(s) to {} = {} (run {})",
            self.succeeded_count(),
            self.outcomes.len(),
            self.field_name,
            self.target_value,
            self.run_id
        )?;
        for outcome in &self.outcomes {
            writeln!(f, "  {outcome}")?;
        }
        Ok(())
    }
}
