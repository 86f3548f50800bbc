//! Thread-safe in-memory project board with failure injection.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::board::{
    domain::{
        BoardId, BoardItem, BoardSchema, CommentId, FieldDescriptor, FieldId, IssueUrl,
        ItemId, STATUS_FIELD, TypedValue, names_match,
    },
    ports::{BoardGateway, GatewayError, GatewayResult, IssueCommenter},
};

/// In-memory board implementing every board port.
///
/// Cloning shares the underlying state, so a test can keep a handle for
/// assertions while services own another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoard {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    schemas: HashMap<BoardId, BoardSchema>,
    items: HashMap<BoardId, Vec<StoredItem>>,
    unreadable_boards: HashSet<BoardId>,
    apply_failures: HashMap<ItemId, VecDeque<GatewayError>>,
    comment_failures: HashMap<IssueUrl, GatewayError>,
    comments: Vec<(IssueUrl, String)>,
    apply_calls: usize,
    list_calls: usize,
    value_changes: usize,
    next_comment_id: u64,
}

#[derive(Debug)]
struct StoredItem {
    item: BoardItem,
    values: HashMap<FieldId, TypedValue>,
}

fn poisoned(err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Rejected(format!("in-memory board state poisoned: {err}"))
}

impl InMemoryBoard {
    /// Creates an empty board store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> GatewayResult<RwLockReadGuard<'_, InMemoryBoardState>> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> GatewayResult<RwLockWriteGuard<'_, InMemoryBoardState>> {
        self.state.write().map_err(poisoned)
    }

    /// Adds (or replaces) a board schema.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn add_board(&self, schema: BoardSchema) -> GatewayResult<()> {
        let mut state = self.write()?;
        state.items.entry(schema.board_id().clone()).or_default();
        state.schemas.insert(schema.board_id().clone(), schema);
        Ok(())
    }

    /// Adds an item to an existing board.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when the board has not been added.
    pub fn add_item(&self, board_id: &BoardId, item: BoardItem) -> GatewayResult<()> {
        let mut state = self.write()?;
        let items = state
            .items
            .get_mut(board_id)
            .ok_or_else(|| GatewayError::NotFound(format!("board {board_id}")))?;
        items.push(StoredItem {
            item,
            values: HashMap::new(),
        });
        Ok(())
    }

    /// Makes every read of the board fail with an authorization error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn deny_access(&self, board_id: &BoardId) -> GatewayResult<()> {
        self.write()?.unreadable_boards.insert(board_id.clone());
        Ok(())
    }

    /// Queues failures returned by the next updates of an item, in order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn fail_updates(
        &self,
        item_id: &ItemId,
        failures: impl IntoIterator<Item = GatewayError>,
    ) -> GatewayResult<()> {
        self.write()?
            .apply_failures
            .entry(item_id.clone())
            .or_default()
            .extend(failures);
        Ok(())
    }

    /// Makes every comment on the issue fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn fail_comments(&self, issue: &IssueUrl, error: GatewayError) -> GatewayResult<()> {
        self.write()?.comment_failures.insert(issue.clone(), error);
        Ok(())
    }

    /// Returns the current value of a field on an item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn field_value(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        field_id: &FieldId,
    ) -> GatewayResult<Option<TypedValue>> {
        let state = self.read()?;
        Ok(state
            .items
            .get(board_id)
            .and_then(|items| items.iter().find(|stored| stored.item.id() == item_id))
            .and_then(|stored| stored.values.get(field_id).cloned()))
    }

    /// Returns every comment posted so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn comments(&self) -> GatewayResult<Vec<(IssueUrl, String)>> {
        Ok(self.read()?.comments.clone())
    }

    /// Returns how many update calls reached the board, failed ones included.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn apply_calls(&self) -> GatewayResult<usize> {
        Ok(self.read()?.apply_calls)
    }

    /// Returns how many item listings were requested, failed ones included.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn list_calls(&self) -> GatewayResult<usize> {
        Ok(self.read()?.list_calls)
    }

    /// Returns how many updates actually changed a stored value.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the state lock is poisoned.
    pub fn value_changes(&self) -> GatewayResult<usize> {
        Ok(self.read()?.value_changes)
    }
}

fn check_value_fits(field: &FieldDescriptor, value: &TypedValue) -> GatewayResult<Option<String>> {
    if field.kind() != value.kind() {
        return Err(GatewayError::Rejected(format!(
            "field '{}' expects {} but received {}",
            field.name(),
            field.kind(),
            value.kind()
        )));
    }
    let TypedValue::SingleSelect(option_id) = value else {
        return Ok(None);
    };
    field
        .options()
        .iter()
        .find(|option| option.id() == option_id)
        .map(|option| Some(option.name().to_owned()))
        .ok_or_else(|| {
            GatewayError::Rejected(format!(
                "option {option_id} does not belong to field '{}'",
                field.name()
            ))
        })
}

#[async_trait]
impl BoardGateway for InMemoryBoard {
    async fn fetch_schema(&self, board_id: &BoardId) -> GatewayResult<BoardSchema> {
        let state = self.read()?;
        if state.unreadable_boards.contains(board_id) {
            return Err(GatewayError::Unauthorized(format!(
                "no read access to board {board_id}"
            )));
        }
        state
            .schemas
            .get(board_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("board {board_id}")))
    }

    async fn apply_field_value(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        field_id: &FieldId,
        value: &TypedValue,
    ) -> GatewayResult<ItemId> {
        let mut state = self.write()?;
        state.apply_calls += 1;

        if let Some(failure) = state
            .apply_failures
            .get_mut(item_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(failure);
        }
        if state.unreadable_boards.contains(board_id) {
            return Err(GatewayError::Unauthorized(format!(
                "no write access to board {board_id}"
            )));
        }

        let schema = state
            .schemas
            .get(board_id)
            .ok_or_else(|| GatewayError::NotFound(format!("board {board_id}")))?;
        let field = schema
            .fields()
            .iter()
            .find(|field| field.id() == field_id)
            .ok_or_else(|| GatewayError::NotFound(format!("field {field_id}")))?;
        let option_name = check_value_fits(field, value)?;
        let is_status = names_match(field.name(), STATUS_FIELD);

        let stored = state
            .items
            .get_mut(board_id)
            .and_then(|items| items.iter_mut().find(|stored| stored.item.id() == item_id))
            .ok_or_else(|| GatewayError::NotFound(format!("item {item_id}")))?;

        let changed = stored.values.get(field_id) != Some(value);
        if changed {
            stored.values.insert(field_id.clone(), value.clone());
            if is_status && let Some(name) = option_name {
                stored.item = stored.item.clone().with_status(name);
            }
            state.value_changes += 1;
        }
        Ok(item_id.clone())
    }

    async fn list_items(&self, board_id: &BoardId) -> GatewayResult<Vec<BoardItem>> {
        let mut state = self.write()?;
        state.list_calls += 1;
        if state.unreadable_boards.contains(board_id) {
            return Err(GatewayError::Unauthorized(format!(
                "no read access to board {board_id}"
            )));
        }
        state
            .items
            .get(board_id)
            .map(|items| items.iter().map(|stored| stored.item.clone()).collect())
            .ok_or_else(|| GatewayError::NotFound(format!("board {board_id}")))
    }
}

#[async_trait]
impl IssueCommenter for InMemoryBoard {
    async fn post_comment(&self, issue: &IssueUrl, body: &str) -> GatewayResult<CommentId> {
        let mut state = self.write()?;
        if let Some(failure) = state.comment_failures.get(issue) {
            return Err(failure.clone());
        }
        state.next_comment_id += 1;
        let id = CommentId::new(state.next_comment_id);
        state.comments.push((issue.clone(), body.to_owned()));
        Ok(id)
    }
}
