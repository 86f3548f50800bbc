//! One-shot schema snapshot for an orchestration run.

use crate::board::{
    domain::{BoardId, BoardSchema},
    ports::{BoardGateway, GatewayResult},
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Fetches immutable board schema snapshots.
///
/// Nothing is retained between calls: every run reads a fresh snapshot so a
/// renamed option or field is picked up immediately.
#[derive(Debug)]
pub struct SchemaCache<G>
where
    G: BoardGateway,
{
    gateway: Arc<G>,
}

impl<G> Clone for SchemaCache<G>
where
    G: BoardGateway,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> SchemaCache<G>
where
    G: BoardGateway,
{
    /// Creates a schema cache over the gateway.
    #[must_use]
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Fetches the schema of `board_id` in one remote round trip.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`crate::board::ports::GatewayError`], notably
    /// `NotFound` for unknown boards and `Unauthorized` without read access.
    #[instrument(skip(self), fields(board = %board_id))]
    pub async fn fetch(&self, board_id: &BoardId) -> GatewayResult<Arc<BoardSchema>> {
        let schema = self.gateway.fetch_schema(board_id).await?;
        debug!(fields = schema.fields().len(), "fetched board schema");
        Ok(Arc::new(schema))
    }
}
