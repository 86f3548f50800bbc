//! Batch moves across many items with injected failures.

use super::helpers::{
    ITEM_COUNT, STATUS_FIELD_ID, board, board_id, issue, item_id, option_id, orchestrator,
};
use boardctl::board::{
    adapters::memory::InMemoryBoard,
    domain::{FieldId, ItemRef, OperationError, TypedValue},
    ports::GatewayError,
    services::BatchRequest,
};
use rstest::rstest;

fn all_items() -> Vec<ItemRef> {
    (0..ITEM_COUNT).map(|index| ItemRef::new(item_id(index))).collect()
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(64)]
#[tokio::test(flavor = "multi_thread")]
async fn every_item_is_reported_once_in_order(board: InMemoryBoard, #[case] concurrency: usize) {
    let request = BatchRequest::move_to_status(board_id(), all_items(), "review");

    let report = orchestrator(&board, concurrency)
        .run(&request)
        .await
        .expect("batch should run");

    assert_eq!(report.outcomes().len(), ITEM_COUNT);
    for (index, outcome) in report.outcomes().iter().enumerate() {
        assert_eq!(outcome.item_id(), &item_id(index));
        assert!(outcome.update_succeeded());
    }
    let field = FieldId::new(STATUS_FIELD_ID).expect("valid field id");
    let value = board
        .field_value(&board_id(), &item_id(ITEM_COUNT - 1), &field)
        .expect("state readable");
    assert_eq!(value, Some(TypedValue::SingleSelect(option_id("Review"))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mixed_failures_are_isolated_per_item(board: InMemoryBoard) {
    board
        .fail_updates(
            &item_id(3),
            [GatewayError::Unauthorized("resource not accessible".to_owned())],
        )
        .expect("failure queued");
    board
        .fail_updates(
            &item_id(7),
            (0..5).map(|_| GatewayError::Network("bad gateway".to_owned())),
        )
        .expect("failures queued");
    board
        .fail_updates(
            &item_id(11),
            [GatewayError::RateLimited {
                message: "secondary rate limit".to_owned(),
                retry_after: None,
            }],
        )
        .expect("failure queued");
    let request = BatchRequest::move_to_status(board_id(), all_items(), "Done");

    let report = orchestrator(&board, 5)
        .run(&request)
        .await
        .expect("batch should run");

    assert_eq!(report.failed_count(), 2);
    assert_eq!(report.succeeded_count(), ITEM_COUNT - 2);
    let errors: Vec<_> = report
        .outcomes()
        .iter()
        .enumerate()
        .filter_map(|(index, outcome)| outcome.update_error().map(|error| (index, error.clone())))
        .collect();
    assert!(matches!(errors.first(), Some((3, OperationError::Auth(_)))));
    assert!(matches!(
        errors.get(1),
        Some((7, OperationError::Transient { attempts: 3, .. }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_land_only_on_linked_issues(board: InMemoryBoard) {
    let items: Vec<ItemRef> = (0..4)
        .map(|index| {
            let item = ItemRef::new(item_id(index));
            if index.is_multiple_of(2) {
                item.with_linked_issue(issue(index))
            } else {
                item
            }
        })
        .collect();
    let request =
        BatchRequest::move_to_status(board_id(), items, "In Progress").with_comment("sprint 12");

    let report = orchestrator(&board, 2)
        .run(&request)
        .await
        .expect("batch should run");

    let attempted: Vec<bool> = report
        .outcomes()
        .iter()
        .map(|outcome| outcome.comment_attempted())
        .collect();
    assert_eq!(attempted, vec![true, false, true, false]);
    let mut commented: Vec<u64> = board
        .comments()
        .expect("comments readable")
        .iter()
        .map(|(url, _)| url.number())
        .collect();
    commented.sort_unstable();
    assert_eq!(commented, vec![100, 102]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_where_every_item_fails_is_all_failed(board: InMemoryBoard) {
    let request = BatchRequest::move_to_status(
        board_id(),
        ["PVTI_gone_1", "PVTI_gone_2"].map(|raw| {
            ItemRef::new(boardctl::board::domain::ItemId::new(raw).expect("valid item id"))
        }),
        "Done",
    );

    let report = orchestrator(&board, 2)
        .run(&request)
        .await
        .expect("batch should run");

    assert!(report.all_failed());
    assert!(report.outcomes().iter().all(|outcome| matches!(
        outcome.update_error(),
        Some(OperationError::NotFound(_))
    )));
}
