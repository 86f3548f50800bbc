//! Shared test helpers for in-memory board integration tests.

use boardctl::board::{
    adapters::memory::InMemoryBoard,
    domain::{
        BoardId, BoardItem, BoardSchema, FieldDescriptor, FieldId, IssueUrl, ItemId,
        OptionDescriptor, OptionId,
    },
    services::{BatchOrchestrator, OrchestratorConfig, RetryPolicy},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::time::Duration;

/// Board node ID used by every test.
pub const BOARD: &str = "PVT_kwDOintegration";
/// Status field node ID.
pub const STATUS_FIELD_ID: &str = "PVTSSF_status";

/// Orchestrator type wired to one shared in-memory board.
pub type TestOrchestrator = BatchOrchestrator<InMemoryBoard, InMemoryBoard, DefaultClock>;

/// Returns the test board identifier.
///
/// # Panics
///
/// Panics if the constant identifier is rejected.
#[must_use]
pub fn board_id() -> BoardId {
    BoardId::new(BOARD).expect("valid board id")
}

/// Returns the identifier of the `index`th seeded item.
///
/// # Panics
///
/// Panics if the generated identifier is rejected.
#[must_use]
pub fn item_id(index: usize) -> ItemId {
    ItemId::new(format!("PVTI_{index:03}")).expect("valid item id")
}

/// Returns the issue linked to the `index`th seeded item.
///
/// # Panics
///
/// Panics if the generated URL is rejected.
#[must_use]
pub fn issue(index: usize) -> IssueUrl {
    IssueUrl::parse(&format!("https://github.com/acme/platform/issues/{}", index + 100))
        .expect("valid issue URL")
}

/// Returns the option ID for a status name.
///
/// # Panics
///
/// Panics if the generated identifier is rejected.
#[must_use]
pub fn option_id(name: &str) -> OptionId {
    OptionId::new(format!("opt_{}", name.to_lowercase().replace(' ', "_")))
        .expect("valid option id")
}

/// Provides a board with `ITEM_COUNT` items, each linked to an issue, and
/// every other item a draft without one.
///
/// # Panics
///
/// Panics if the board cannot be seeded.
#[fixture]
pub fn board() -> InMemoryBoard {
    let board = InMemoryBoard::new();
    let status = FieldDescriptor::single_select(
        FieldId::new(STATUS_FIELD_ID).expect("valid field id"),
        "Status",
        ["Backlog", "Todo", "In Progress", "Review", "Done"]
            .map(|name| OptionDescriptor::new(option_id(name), name)),
    );
    board
        .add_board(BoardSchema::new(board_id(), [status]))
        .expect("board added");
    for index in 0..ITEM_COUNT {
        let item = BoardItem::new(item_id(index), format!("Task {index}")).with_status("Backlog");
        let seeded = if index.is_multiple_of(2) {
            item.with_issue(issue(index))
        } else {
            item
        };
        board.add_item(&board_id(), seeded).expect("item added");
    }
    board
}

/// Number of items seeded by [`board`].
pub const ITEM_COUNT: usize = 20;

/// Builds an orchestrator over `board` with fast retries.
#[must_use]
pub fn orchestrator(board: &InMemoryBoard, concurrency: usize) -> TestOrchestrator {
    let config = OrchestratorConfig {
        concurrency: NonZeroUsize::new(concurrency).unwrap_or(NonZeroUsize::MIN),
        retry: RetryPolicy::new(
            NonZeroU32::MIN.saturating_add(2),
            Duration::from_millis(1),
        ),
    };
    BatchOrchestrator::new(
        Arc::new(board.clone()),
        Arc::new(board.clone()),
        Arc::new(DefaultClock),
        config,
    )
}
