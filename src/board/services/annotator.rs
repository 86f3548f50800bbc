//! Best-effort audit comments on linked issues.

use super::retry::{RetryPolicy, run_with_retry};
use crate::board::{
    domain::{CommentId, IssueUrl, OperationError},
    ports::IssueCommenter,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Posts audit comments on the issue an item wraps.
#[derive(Debug)]
pub struct AuditAnnotator<C>
where
    C: IssueCommenter,
{
    commenter: Arc<C>,
    policy: RetryPolicy,
}

impl<C> AuditAnnotator<C>
where
    C: IssueCommenter,
{
    /// Creates an annotator using `policy` for transient failures.
    #[must_use]
    pub const fn new(commenter: Arc<C>, policy: RetryPolicy) -> Self {
        Self { commenter, policy }
    }

    /// Posts `message` on `issue`.
    ///
    /// # Errors
    ///
    /// Returns an [`OperationError`] when the comment cannot be posted; the
    /// caller records it without touching the field update's outcome.
    #[instrument(skip_all, fields(issue = %issue))]
    pub async fn annotate(
        &self,
        issue: &IssueUrl,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<CommentId, OperationError> {
        let comment_id = run_with_retry(&self.policy, cancel, "post_issue_comment", || {
            self.commenter.post_comment(issue, message)
        })
        .await?;
        debug!(comment = %comment_id, "audit comment posted");
        Ok(comment_id)
    }
}
