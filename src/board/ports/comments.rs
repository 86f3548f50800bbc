//! Issue comment port used for audit annotations.

use super::GatewayResult;
use crate::board::domain::{CommentId, IssueUrl};
use async_trait::async_trait;

/// Posts comments on issues and pull requests.
#[async_trait]
pub trait IssueCommenter: Send + Sync {
    /// Posts `body` as a new comment on the issue.
    ///
    /// # Errors
    ///
    /// Returns a [`super::GatewayError`] when the issue is unknown, the caller
    /// lacks permission, or the request fails.
    async fn post_comment(&self, issue: &IssueUrl, body: &str) -> GatewayResult<CommentId>;
}
