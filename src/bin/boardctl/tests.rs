//! Unit tests for argument parsing and command execution.

use super::cli::{Cli, Command, LogFormat};
use super::commands::{CliError, Completion, Context, execute};
use boardctl::board::adapters::memory::InMemoryBoard;
use boardctl::board::domain::{
    BoardId, BoardItem, BoardSchema, FieldDescriptor, FieldId, IssueUrl, ItemId, OptionDescriptor,
    OptionId, ResolutionError,
};
use boardctl::board::ports::GatewayError;
use boardctl::board::services::{BatchError, OrchestratorConfig, RetryPolicy};
use clap::Parser;
use rstest::{fixture, rstest};
use std::sync::Arc;

const BOARD: &str = "PVT_board";

fn option(id: &str, name: &str) -> OptionDescriptor {
    OptionDescriptor::new(OptionId::new(id).expect("valid option id"), name)
}

fn issue(number: u64) -> IssueUrl {
    IssueUrl::parse(&format!("https://github.com/acme/widgets/issues/{number}"))
        .expect("valid issue URL")
}

#[fixture]
fn board() -> InMemoryBoard {
    let board = InMemoryBoard::new();
    let board_id = BoardId::new(BOARD).expect("valid board id");
    let status = FieldDescriptor::single_select(
        FieldId::new("PVTSSF_status").expect("valid field id"),
        "Status",
        vec![
            option("opt_todo", "Todo"),
            option("opt_progress", "In Progress"),
            option("opt_done", "Done"),
        ],
    );
    board
        .add_board(BoardSchema::new(board_id.clone(), vec![status]))
        .expect("board should be added");
    for (id, title, number, status) in [
        ("item_a", "Fix login redirect", 1, "Todo"),
        ("item_b", "Write release notes", 2, "Done"),
    ] {
        let item = BoardItem::new(ItemId::new(id).expect("valid item id"), title)
            .with_issue(issue(number))
            .with_status(status);
        board.add_item(&board_id, item).expect("item should be added");
    }
    board
}

fn context(board: &InMemoryBoard) -> Context<InMemoryBoard, InMemoryBoard> {
    let config = OrchestratorConfig {
        retry: RetryPolicy::no_retry(),
        ..OrchestratorConfig::default()
    };
    Context::new(
        Arc::new(board.clone()),
        Arc::new(board.clone()),
        Some(BoardId::new(BOARD).expect("valid board id")),
        "Status",
        config,
    )
}

async fn run(board: &InMemoryBoard, args: &[&str]) -> (Result<Completion, CliError>, String) {
    let cli = Cli::try_parse_from(std::iter::once("boardctl").chain(args.iter().copied()))
        .expect("arguments should parse");
    let mut out = Vec::new();
    let result = execute(&context(board), &cli.command, &mut out).await;
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[rstest]
fn batch_move_accepts_comma_and_space_separated_ids() {
    let cli = Cli::try_parse_from([
        "boardctl",
        "batch-move",
        "--item-ids",
        "a,b",
        "c",
        "--status",
        "Done",
    ])
    .expect("arguments should parse");

    assert_eq!(cli.field, "Status");
    assert_eq!(cli.log_format, LogFormat::Text);
    let Command::BatchMove { item_ids, .. } = cli.command else {
        panic!("expected batch-move");
    };
    assert_eq!(item_ids, vec!["a", "b", "c"]);
}

#[rstest]
fn batch_move_requires_item_ids() {
    assert!(Cli::try_parse_from(["boardctl", "batch-move", "--status", "Done"]).is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_reports_the_update_and_posts_the_comment(board: InMemoryBoard) {
    let (result, out) = run(
        &board,
        &["move", "--item-id", "item_a", "--status", "in progress", "--comment", "picked up"],
    )
    .await;

    assert_eq!(result.expect("move should run"), Completion::Success);
    assert!(out.starts_with("Moved 1/1 item(s) to Status = in progress"));
    assert!(out.contains("item_a updated, comment 1 posted"));
    let comments = board.comments().expect("comments readable");
    assert_eq!(comments, vec![(issue(1), "picked up".to_owned())]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_where_every_item_fails_exits_as_failed(board: InMemoryBoard) {
    let (result, out) = run(
        &board,
        &["batch-move", "--item-ids", "ghost_1", "ghost_2", "--status", "Done"],
    )
    .await;

    assert_eq!(result.expect("batch should run"), Completion::BatchFailed);
    assert!(out.contains("FAILED  ghost_1"));
    assert!(out.contains("FAILED  ghost_2"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_status_fails_before_any_update(board: InMemoryBoard) {
    let (result, _) = run(
        &board,
        &["move", "--item-id", "item_a", "--status", "Blocked"],
    )
    .await;

    assert!(matches!(
        result,
        Err(CliError::Batch(BatchError::Resolution(
            ResolutionError::InvalidValue { .. }
        )))
    ));
    assert_eq!(board.apply_calls().expect("counter readable"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_status_with_comment_skips_the_item_listing(board: InMemoryBoard) {
    let (result, _) = run(
        &board,
        &["move", "--item-id", "item_a", "--status", "Blocked", "--comment", "parked"],
    )
    .await;

    assert!(matches!(
        result,
        Err(CliError::Batch(BatchError::Resolution(
            ResolutionError::InvalidValue { .. }
        )))
    ));
    assert_eq!(board.list_calls().expect("counter readable"), 0);
    assert!(board.comments().expect("comments readable").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn statuses_prints_one_option_per_line(board: InMemoryBoard) {
    let (result, out) = run(&board, &["statuses"]).await;

    assert_eq!(result.expect("statuses should run"), Completion::Success);
    assert_eq!(out, "Todo\nIn Progress\nDone\n");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_groups_items_by_status(board: InMemoryBoard) {
    let (result, out) = run(&board, &["list"]).await;

    assert_eq!(result.expect("list should run"), Completion::Success);
    assert_eq!(
        out,
        "Todo (1)\n  #1 Fix login redirect [item_a]\nDone (1)\n  #2 Write release notes [item_b]\n"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_filters_by_keywords_and_status(board: InMemoryBoard) {
    let (result, out) = run(&board, &["search", "release", "notes", "--status-filter", "done"]).await;

    assert_eq!(result.expect("search should run"), Completion::Success);
    assert!(out.contains("Write release notes"));
    assert!(!out.contains("Fix login redirect"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_failure_is_a_command_error(board: InMemoryBoard) {
    board
        .fail_comments(&issue(2), GatewayError::Unauthorized("no scope".to_owned()))
        .expect("failure registered");

    let (result, _) = run(
        &board,
        &[
            "comment",
            "--issue-url",
            "https://github.com/acme/widgets/issues/2",
            "--message",
            "hello",
        ],
    )
    .await;

    assert!(matches!(result, Err(CliError::Operation(_))));
}
