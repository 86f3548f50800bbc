//! Then steps for batch move BDD scenarios.

use super::world::{BatchMoveWorld, board_id, issue, run_async, split_list};
use boardctl::board::{
    domain::{ItemId, ResolutionError},
    ports::BoardGateway,
    services::BatchError,
};
use eyre::WrapErr;
use rstest_bdd_macros::then;

#[then("{count:usize} items are reported as updated")]
fn items_reported_updated(world: &BatchMoveWorld, count: usize) -> Result<(), eyre::Report> {
    let report = world.report()?;
    eyre::ensure!(
        report.succeeded_count() == count,
        "expected {count} updated items, report was:\n{report}"
    );
    Ok(())
}

#[then(r#"item "{item}" has status "{status}""#)]
fn item_has_status(world: &BatchMoveWorld, item: String, status: String) -> Result<(), eyre::Report> {
    let items = run_async(world.board.list_items(&board_id()?)).wrap_err("list board items")?;
    let wanted = ItemId::new(item.as_str()).wrap_err("build item id")?;
    let found = items
        .iter()
        .find(|candidate| candidate.id() == &wanted)
        .ok_or_else(|| eyre::eyre!("item {item} not on board"))?;
    eyre::ensure!(
        found.status() == Some(status.as_str()),
        "expected status {status}, found {:?}",
        found.status()
    );
    Ok(())
}

#[then(r#"issue {number:u64} received the comment "{comment}""#)]
fn issue_received_comment(
    world: &BatchMoveWorld,
    number: u64,
    comment: String,
) -> Result<(), eyre::Report> {
    let expected = (issue(number)?, comment);
    let comments = world.board.comments().wrap_err("read comments")?;
    eyre::ensure!(
        comments.contains(&expected),
        "missing comment {expected:?} in {comments:?}"
    );
    Ok(())
}

#[then(r#"the batch fails listing "{options}""#)]
fn batch_fails_listing(world: &BatchMoveWorld, options: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no batch has run in this scenario"))?;
    let Err(BatchError::Resolution(ResolutionError::InvalidValue {
        available_options, ..
    })) = result
    else {
        return Err(eyre::eyre!("expected InvalidValue error, got {result:?}"));
    };
    eyre::ensure!(
        available_options == &split_list(&options),
        "expected options {options}, got {available_options:?}"
    );
    Ok(())
}

#[then("no update reached the board")]
fn no_update_reached_board(world: &BatchMoveWorld) -> Result<(), eyre::Report> {
    let calls = world.board.apply_calls().wrap_err("read update counter")?;
    eyre::ensure!(calls == 0, "expected no updates, saw {calls}");
    Ok(())
}

#[then(r#"the outcomes are "{outcomes}""#)]
fn outcomes_are(world: &BatchMoveWorld, outcomes: String) -> Result<(), eyre::Report> {
    let actual: Vec<String> = world
        .report()?
        .outcomes()
        .iter()
        .map(|outcome| {
            if outcome.update_succeeded() {
                "updated".to_owned()
            } else {
                "failed".to_owned()
            }
        })
        .collect();
    eyre::ensure!(
        actual == split_list(&outcomes),
        "expected outcomes {outcomes}, got {actual:?}"
    );
    Ok(())
}

#[then(r#"the comment for item "{item}" failed"#)]
fn comment_failed(world: &BatchMoveWorld, item: String) -> Result<(), eyre::Report> {
    let outcome = world
        .report()?
        .outcomes()
        .iter()
        .find(|outcome| outcome.item_id().as_str() == item)
        .ok_or_else(|| eyre::eyre!("no outcome for {item}"))?;
    eyre::ensure!(
        outcome.update_succeeded() && outcome.comment_attempted() && !outcome.comment_succeeded(),
        "expected a successful update with a failed comment, got {outcome}"
    );
    Ok(())
}
