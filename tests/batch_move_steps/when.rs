//! When steps for batch move BDD scenarios.

use super::world::{BatchMoveWorld, board_id, run_async, split_list};
use boardctl::board::{
    domain::ItemId,
    services::{BatchOrchestrator, BatchRequest, BoardQueryService, OrchestratorConfig},
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::when;
use std::sync::Arc;

fn move_items(
    world: &mut BatchMoveWorld,
    items: &str,
    status: &str,
    comment: Option<String>,
) -> Result<(), eyre::Report> {
    let ids = split_list(items)
        .into_iter()
        .map(ItemId::new)
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("build item ids")?;
    let queries = BoardQueryService::new(Arc::new(world.board.clone()));
    let refs = run_async(queries.item_refs(&board_id()?, &ids)).wrap_err("look up items")?;

    let mut request = BatchRequest::move_to_status(board_id()?, refs, status);
    if let Some(text) = comment {
        request = request.with_comment(text);
    }
    let orchestrator = BatchOrchestrator::new(
        Arc::new(world.board.clone()),
        Arc::new(world.board.clone()),
        Arc::new(DefaultClock),
        OrchestratorConfig::default(),
    );
    world.last_result = Some(run_async(orchestrator.run(&request)));
    Ok(())
}

#[when(r#"items "{items}" are moved to "{status}" with comment "{comment}""#)]
fn move_with_comment(
    world: &mut BatchMoveWorld,
    items: String,
    status: String,
    comment: String,
) -> Result<(), eyre::Report> {
    move_items(world, &items, &status, Some(comment))
}

#[when(r#"items "{items}" are moved to "{status}" without a comment"#)]
fn move_without_comment(
    world: &mut BatchMoveWorld,
    items: String,
    status: String,
) -> Result<(), eyre::Report> {
    move_items(world, &items, &status, None)
}
