//! Field update execution with retry.

use super::retry::{RetryPolicy, run_with_retry};
use crate::board::{
    domain::{BoardId, FieldId, ItemId, OperationError, TypedValue},
    ports::BoardGateway,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Applies one field value to one item.
#[derive(Debug)]
pub struct MutationExecutor<G>
where
    G: BoardGateway,
{
    gateway: Arc<G>,
    policy: RetryPolicy,
}

impl<G> MutationExecutor<G>
where
    G: BoardGateway,
{
    /// Creates an executor using `policy` for transient failures.
    #[must_use]
    pub const fn new(gateway: Arc<G>, policy: RetryPolicy) -> Self {
        Self { gateway, policy }
    }

    /// Returns the retry policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Writes `value` to `field_id` on `item_id`.
    ///
    /// Idempotent: writing the current value again succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::NotFound`] or [`OperationError::Auth`]
    /// immediately, [`OperationError::Transient`] once the retry budget is
    /// exhausted, and [`OperationError::Cancelled`] when `cancel` fires
    /// between attempts.
    #[instrument(skip_all, fields(board = %board_id, item = %item_id, field = %field_id))]
    pub async fn apply(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        field_id: &FieldId,
        value: &TypedValue,
        cancel: &CancellationToken,
    ) -> Result<(), OperationError> {
        run_with_retry(&self.policy, cancel, "apply_field_value", || {
            self.gateway
                .apply_field_value(board_id, item_id, field_id, value)
        })
        .await?;
        debug!(%value, "field value applied");
        Ok(())
    }
}
