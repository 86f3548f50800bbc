//! Batch orchestration of field updates and audit comments.

use super::{
    annotator::AuditAnnotator,
    executor::MutationExecutor,
    retry::RetryPolicy,
    schema_cache::SchemaCache,
};
use crate::board::{
    domain::{
        BatchOutcome, BatchReport, BatchRunId, BoardId, ItemRef, ResolutionError,
        ResolvedFieldValue, STATUS_FIELD, resolve,
    },
    ports::{BoardGateway, GatewayError, IssueCommenter},
};
use futures::stream::{self, StreamExt};
use mockable::Clock;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_CONCURRENCY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(4);

/// Tuning for batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum number of items processed at the same time.
    pub concurrency: NonZeroUsize,
    /// Retry policy shared by updates and comments.
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

/// Request payload for moving many items to the same field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    board_id: BoardId,
    items: Vec<ItemRef>,
    field_name: String,
    target_value: String,
    comment: Option<String>,
}

impl BatchRequest {
    /// Creates a request setting `field_name` to `target_value` on `items`.
    #[must_use]
    pub fn new(
        board_id: BoardId,
        items: impl IntoIterator<Item = ItemRef>,
        field_name: impl Into<String>,
        target_value: impl Into<String>,
    ) -> Self {
        Self {
            board_id,
            items: items.into_iter().collect(),
            field_name: field_name.into(),
            target_value: target_value.into(),
            comment: None,
        }
    }

    /// Creates a request moving `items` to the status option `status`.
    #[must_use]
    pub fn move_to_status(
        board_id: BoardId,
        items: impl IntoIterator<Item = ItemRef>,
        status: impl Into<String>,
    ) -> Self {
        Self::new(board_id, items, STATUS_FIELD, status)
    }

    /// Sets the audit comment posted on each item's linked issue.
    ///
    /// Blank comments are ignored.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let value = comment.into();
        self.comment = (!value.trim().is_empty()).then_some(value);
        self
    }

    /// Returns the target board.
    #[must_use]
    pub const fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// Returns the items in request order.
    #[must_use]
    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    /// Returns the requested field name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the requested value, as typed by the caller.
    #[must_use]
    pub fn target_value(&self) -> &str {
        &self.target_value
    }

    /// Returns the audit comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Batch-level failures: nothing was mutated when one is returned.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The board schema could not be read.
    #[error("failed to fetch board schema: {0}")]
    Schema(#[source] GatewayError),
    /// The field or value cannot be resolved on this board.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The batch was cancelled before any item was started.
    #[error("batch cancelled before any item was processed")]
    Cancelled,
}

/// Result type for batch runs.
pub type BatchResult<T> = Result<T, BatchError>;

/// Drives resolution, updates and audit comments for a batch of items.
pub struct BatchOrchestrator<G, C, K>
where
    G: BoardGateway,
    C: IssueCommenter,
    K: Clock + Send + Sync,
{
    schema_cache: SchemaCache<G>,
    executor: MutationExecutor<G>,
    annotator: AuditAnnotator<C>,
    clock: Arc<K>,
    concurrency: NonZeroUsize,
}

impl<G, C, K> BatchOrchestrator<G, C, K>
where
    G: BoardGateway,
    C: IssueCommenter,
    K: Clock + Send + Sync,
{
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(gateway: Arc<G>, commenter: Arc<C>, clock: Arc<K>, config: OrchestratorConfig) -> Self {
        Self {
            schema_cache: SchemaCache::new(Arc::clone(&gateway)),
            executor: MutationExecutor::new(gateway, config.retry),
            annotator: AuditAnnotator::new(commenter, config.retry),
            clock,
            concurrency: config.concurrency,
        }
    }

    /// Runs a batch to completion.
    ///
    /// # Errors
    ///
    /// See [`Self::run_with_cancellation`].
    pub async fn run(&self, request: &BatchRequest) -> BatchResult<BatchReport> {
        self.run_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Moves a single item; a batch of one.
    ///
    /// # Errors
    ///
    /// See [`Self::run_with_cancellation`].
    pub async fn move_item(
        &self,
        board_id: BoardId,
        item: ItemRef,
        status: &str,
        comment: Option<&str>,
    ) -> BatchResult<BatchReport> {
        let mut request = BatchRequest::move_to_status(board_id, [item], status);
        if let Some(text) = comment {
            request = request.with_comment(text);
        }
        self.run(&request).await
    }

    /// Fetches the schema and resolves `field_name = raw_value` without
    /// touching any item.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Schema`] when the schema cannot be read and
    /// [`BatchError::Resolution`] when the field or value does not resolve.
    pub async fn resolve_target(
        &self,
        board_id: &BoardId,
        field_name: &str,
        raw_value: &str,
    ) -> BatchResult<ResolvedFieldValue> {
        let schema = self
            .schema_cache
            .fetch(board_id)
            .await
            .map_err(BatchError::Schema)?;
        Ok(resolve(&schema, field_name, raw_value)?)
    }

    /// Runs a batch that `cancel` may stop early.
    ///
    /// The schema is fetched and the target resolved once, before any item
    /// is touched. Items are then processed independently with bounded
    /// concurrency; per-item failures land in the report. The report holds
    /// exactly one outcome per requested item, in request order, even when
    /// the batch is cancelled part-way: items not yet started are reported
    /// as cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Schema`] when the schema cannot be read,
    /// [`BatchError::Resolution`] when the field or value does not resolve,
    /// and [`BatchError::Cancelled`] when cancellation arrives before any item
    /// is started.
    pub async fn run_with_cancellation(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
    ) -> BatchResult<BatchReport> {
        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }
        let run_id = BatchRunId::new();
        let started_at = self.clock.utc();

        let target = self
            .resolve_target(
                request.board_id(),
                request.field_name(),
                request.target_value(),
            )
            .await?;
        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }
        info!(
            run = %run_id,
            board = %request.board_id(),
            field = target.field_name(),
            value = request.target_value(),
            items = request.items().len(),
            "starting batch"
        );

        let outcomes = self.process_items(request, &target, cancel).await;
        let report = BatchReport::new(
            run_id,
            request.board_id().clone(),
            target.field_name().to_owned(),
            request.target_value().to_owned(),
            started_at,
            self.clock.utc(),
            outcomes,
        );
        info!(
            run = %run_id,
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            "batch finished"
        );
        Ok(report)
    }

    async fn process_items(
        &self,
        request: &BatchRequest,
        target: &ResolvedFieldValue,
        cancel: &CancellationToken,
    ) -> Vec<BatchOutcome> {
        let completed: Vec<(usize, BatchOutcome)> = stream::iter(request.items().iter().enumerate())
            .map(|(index, item)| async move {
                (index, self.process_item(request, target, item, cancel).await)
            })
            .buffer_unordered(self.concurrency.get())
            .collect()
            .await;

        let mut slots: Vec<Option<BatchOutcome>> = vec![None; request.items().len()];
        for (index, outcome) in completed {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(outcome);
            }
        }
        request
            .items()
            .iter()
            .zip(slots)
            .map(|(item, slot)| slot.unwrap_or_else(|| BatchOutcome::cancelled(item.item_id().clone())))
            .collect()
    }

    async fn process_item(
        &self,
        request: &BatchRequest,
        target: &ResolvedFieldValue,
        item: &ItemRef,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let item_id = item.item_id();
        if cancel.is_cancelled() {
            debug!(item = %item_id, "skipping item after cancellation");
            return BatchOutcome::cancelled(item_id.clone());
        }

        if let Err(error) = self
            .executor
            .apply(
                request.board_id(),
                item_id,
                target.field_id(),
                target.value(),
                cancel,
            )
            .await
        {
            warn!(item = %item_id, error = %error, "field update failed");
            return BatchOutcome::update_failed(item_id.clone(), error);
        }

        let outcome = BatchOutcome::updated(item_id.clone());
        let (Some(comment), Some(issue)) = (request.comment(), item.linked_issue()) else {
            return outcome;
        };
        let result = self.annotator.annotate(issue, comment, cancel).await;
        if let Err(error) = &result {
            warn!(item = %item_id, issue = %issue, error = %error, "audit comment failed");
        }
        outcome.with_comment(result)
    }
}
