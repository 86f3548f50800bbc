//! Remote board port: schema reads, item listing and field updates.

use crate::board::domain::{BoardId, BoardItem, BoardSchema, FieldId, ItemId, TypedValue};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for remote board operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote project board contract.
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Fetches the field and option metadata of a board.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when the board is unknown and
    /// [`GatewayError::Unauthorized`] when the caller cannot read it.
    async fn fetch_schema(&self, board_id: &BoardId) -> GatewayResult<BoardSchema>;

    /// Writes one field value on one item.
    ///
    /// Writing the value an item already holds succeeds without a visible
    /// change. Returns the updated item's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when the item or field does not
    /// exist on the board.
    async fn apply_field_value(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        field_id: &FieldId,
        value: &TypedValue,
    ) -> GatewayResult<ItemId>;

    /// Lists every item of a board with its linked issue and status.
    async fn list_items(&self, board_id: &BoardId) -> GatewayResult<Vec<BoardItem>>;
}

/// Errors returned by remote adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The credentials are missing, invalid or lack the required scope.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The board, item, field or issue does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote rate-limit budget is exhausted.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Remote message.
        message: String,
        /// Server-provided wait before the next attempt, if any.
        retry_after: Option<Duration>,
    },

    /// The request could not be delivered or the server failed.
    #[error("network error: {0}")]
    Network(String),

    /// The remote system rejected the request.
    #[error("rejected by remote: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// Returns `true` for failures that may succeed when retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network(_))
    }

    /// Returns the server-provided retry hint, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
