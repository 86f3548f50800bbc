//! Given steps for batch move BDD scenarios.

use super::world::{BatchMoveWorld, STATUS_FIELD_ID, board_id, issue, split_list};
use boardctl::board::{
    domain::{BoardItem, BoardSchema, FieldDescriptor, FieldId, ItemId, OptionDescriptor, OptionId},
    ports::GatewayError,
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a board with statuses "{statuses}""#)]
fn board_with_statuses(world: &mut BatchMoveWorld, statuses: String) -> Result<(), eyre::Report> {
    let options = split_list(&statuses)
        .into_iter()
        .map(|name| -> Result<OptionDescriptor, eyre::Report> {
            let id = OptionId::new(format!("opt_{}", name.to_lowercase().replace(' ', "_")))
                .wrap_err("build option id")?;
            Ok(OptionDescriptor::new(id, name))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let field = FieldDescriptor::single_select(
        FieldId::new(STATUS_FIELD_ID).wrap_err("build field id")?,
        "Status",
        options,
    );
    world
        .board
        .add_board(BoardSchema::new(board_id()?, [field]))
        .wrap_err("seed board schema")?;
    Ok(())
}

#[given(r#"item "{item}" linked to issue {number:u64}"#)]
fn item_linked_to_issue(
    world: &mut BatchMoveWorld,
    item: String,
    number: u64,
) -> Result<(), eyre::Report> {
    let seeded = BoardItem::new(ItemId::new(item.as_str()).wrap_err("build item id")?, item)
        .with_issue(issue(number)?)
        .with_status("Todo");
    world
        .board
        .add_item(&board_id()?, seeded)
        .wrap_err("seed board item")?;
    Ok(())
}

#[given("comments on issue {number:u64} are rejected")]
fn comments_rejected(world: &mut BatchMoveWorld, number: u64) -> Result<(), eyre::Report> {
    world
        .board
        .fail_comments(
            &issue(number)?,
            GatewayError::Unauthorized("Resource not accessible by integration".to_owned()),
        )
        .wrap_err("register comment failure")?;
    Ok(())
}
