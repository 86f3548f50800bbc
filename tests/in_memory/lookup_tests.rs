//! Linked-issue lookup combined with commented moves.

use super::helpers::{ITEM_COUNT, board, board_id, issue, item_id, orchestrator};
use boardctl::board::{
    adapters::memory::InMemoryBoard,
    domain::ItemId,
    services::{BatchRequest, BoardQueryService},
};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn looked_up_items_are_commented_on_their_issues(board: InMemoryBoard) {
    let queries = BoardQueryService::new(Arc::new(board.clone()));
    let ids: Vec<ItemId> = [0, 1, 2].map(item_id).to_vec();

    let items = queries
        .item_refs(&board_id(), &ids)
        .await
        .expect("items listed");
    let request = BatchRequest::move_to_status(board_id(), items, "Todo")
        .with_comment("Moved to Todo by triage");
    let report = orchestrator(&board, 3)
        .run(&request)
        .await
        .expect("batch should run");

    assert_eq!(report.succeeded_count(), 3);
    let mut comments = board.comments().expect("comments readable");
    comments.sort_by_key(|(url, _)| url.number());
    assert_eq!(
        comments,
        vec![
            (issue(0), "Moved to Todo by triage".to_owned()),
            (issue(2), "Moved to Todo by triage".to_owned()),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_filter_sees_completed_moves(board: InMemoryBoard) {
    let queries = BoardQueryService::new(Arc::new(board.clone()));
    let request = BatchRequest::move_to_status(
        board_id(),
        queries
            .item_refs(&board_id(), &[item_id(4), item_id(5)])
            .await
            .expect("items listed"),
        "Done",
    );
    orchestrator(&board, 2)
        .run(&request)
        .await
        .expect("batch should run");

    let done = queries
        .list_items(&board_id(), Some("done"))
        .await
        .expect("items listed");
    let backlog = queries
        .list_items(&board_id(), Some("Backlog"))
        .await
        .expect("items listed");

    assert_eq!(done.len(), 2);
    assert_eq!(backlog.len(), ITEM_COUNT - 2);
}
