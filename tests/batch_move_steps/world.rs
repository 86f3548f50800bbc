//! Shared world state for batch move BDD scenarios.

use boardctl::board::{
    adapters::memory::InMemoryBoard,
    domain::{BatchReport, BoardId, IssueUrl},
    services::BatchResult,
};
use rstest::fixture;

/// Board node ID used by every scenario.
pub const BOARD: &str = "PVT_kwDObdd";
/// Status field node ID.
pub const STATUS_FIELD_ID: &str = "PVTSSF_status";

/// Scenario world for batch move behaviour tests.
pub struct BatchMoveWorld {
    pub board: InMemoryBoard,
    pub last_result: Option<BatchResult<BatchReport>>,
}

impl BatchMoveWorld {
    /// Creates a world with an empty board store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: InMemoryBoard::new(),
            last_result: None,
        }
    }

    /// Returns the report of the last batch.
    ///
    /// # Errors
    ///
    /// Returns an error if no batch ran or the batch failed.
    pub fn report(&self) -> Result<&BatchReport, eyre::Report> {
        match self.last_result.as_ref() {
            Some(Ok(report)) => Ok(report),
            Some(Err(err)) => Err(eyre::eyre!("batch failed: {err}")),
            None => Err(eyre::eyre!("no batch has run in this scenario")),
        }
    }
}

impl Default for BatchMoveWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BatchMoveWorld {
    BatchMoveWorld::default()
}

/// Returns the scenario board identifier.
///
/// # Errors
///
/// Returns an error if the identifier is rejected.
pub fn board_id() -> Result<BoardId, eyre::Report> {
    BoardId::new(BOARD).map_err(|err| eyre::eyre!("invalid board id: {err}"))
}

/// Returns the issue URL with the given number.
///
/// # Errors
///
/// Returns an error if the URL is rejected.
pub fn issue(number: u64) -> Result<IssueUrl, eyre::Report> {
    IssueUrl::parse(&format!("https://github.com/acme/bdd/issues/{number}"))
        .map_err(|err| eyre::eyre!("invalid issue URL: {err}"))
}

/// Splits a comma-separated step argument.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
