//! Application services for board moves and queries.

mod annotator;
mod executor;
mod orchestrator;
mod query;
mod retry;
mod schema_cache;

pub use annotator::AuditAnnotator;
pub use executor::MutationExecutor;
pub use orchestrator::{
    BatchError, BatchOrchestrator, BatchRequest, BatchResult, OrchestratorConfig,
};
pub use query::{
    BoardQueryError, BoardQueryResult, BoardQueryService, NO_STATUS, SearchQuery, StatusGroup,
    group_by_status,
};
pub use retry::RetryPolicy;
pub use schema_cache::SchemaCache;
