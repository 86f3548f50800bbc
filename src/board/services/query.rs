//! Read-only board queries: statuses, listings, search and item lookup.

use super::schema_cache::SchemaCache;
use crate::board::{
    domain::{BoardId, BoardItem, ItemId, ItemRef, names_match},
    ports::{BoardGateway, GatewayError},
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Status label for items whose status field is unset.
pub const NO_STATUS: &str = "No Status";

/// Service-level errors for board queries.
#[derive(Debug, Error)]
pub enum BoardQueryError {
    /// Remote read failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result type for board queries.
pub type BoardQueryResult<T> = Result<T, BoardQueryError>;

/// Free-text search over item titles and bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: String,
    exact: bool,
    status: Option<String>,
}

impl SearchQuery {
    /// Creates a keyword search: every keyword must appear in the title, or
    /// every keyword in the body.
    #[must_use]
    pub fn keywords(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
            exact: false,
            status: None,
        }
    }

    /// Creates an exact phrase search over title and body.
    #[must_use]
    pub fn phrase(terms: impl Into<String>) -> Self {
        Self {
            exact: true,
            ..Self::keywords(terms)
        }
    }

    /// Restricts matches to items with the given status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Returns `true` when the item matches the query.
    ///
    /// Blank search terms match nothing.
    #[must_use]
    pub fn matches(&self, item: &BoardItem) -> bool {
        if self.terms.trim().is_empty() {
            return false;
        }
        if let Some(status) = &self.status
            && !status_matches(item, status)
        {
            return false;
        }
        let needle = self.terms.to_lowercase();
        let title = item.title().to_lowercase();
        let body = item.body().unwrap_or_default().to_lowercase();
        if self.exact {
            return title.contains(&needle) || body.contains(&needle);
        }
        let keywords: Vec<&str> = needle.split_whitespace().collect();
        let all_in = |text: &str| keywords.iter().all(|keyword| text.contains(keyword));
        all_in(&title) || all_in(&body)
    }
}

/// Items sharing one status, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGroup {
    /// Status name, or [`NO_STATUS`].
    pub status: String,
    /// Items with that status, in board order.
    pub items: Vec<BoardItem>,
}

fn status_matches(item: &BoardItem, status: &str) -> bool {
    names_match(item.status().unwrap_or(NO_STATUS), status)
}

/// Groups items by status, keeping board order inside and across groups.
#[must_use]
pub fn group_by_status(items: &[BoardItem]) -> Vec<StatusGroup> {
    let mut groups: Vec<StatusGroup> = Vec::new();
    for item in items {
        let status = item.status().unwrap_or(NO_STATUS);
        if let Some(group) = groups.iter_mut().find(|group| group.status == status) {
            group.items.push(item.clone());
        } else {
            groups.push(StatusGroup {
                status: status.to_owned(),
                items: vec![item.clone()],
            });
        }
    }
    groups
}

/// Read-only board queries.
pub struct BoardQueryService<G>
where
    G: BoardGateway,
{
    gateway: Arc<G>,
    schema_cache: SchemaCache<G>,
}

impl<G> BoardQueryService<G>
where
    G: BoardGateway,
{
    /// Creates a query service over the gateway.
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            schema_cache: SchemaCache::new(Arc::clone(&gateway)),
            gateway,
        }
    }

    /// Returns the option names of the status field, in board order.
    ///
    /// Boards without a single-select status field yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`BoardQueryError::Gateway`] when the schema cannot be read.
    pub async fn statuses(&self, board_id: &BoardId) -> BoardQueryResult<Vec<String>> {
        let schema = self.schema_cache.fetch(board_id).await?;
        Ok(schema.status_options())
    }

    /// Lists items, optionally only those with the given status.
    ///
    /// # Errors
    ///
    /// Returns [`BoardQueryError::Gateway`] when the listing fails.
    pub async fn list_items(
        &self,
        board_id: &BoardId,
        status: Option<&str>,
    ) -> BoardQueryResult<Vec<BoardItem>> {
        let items = self.gateway.list_items(board_id).await?;
        Ok(match status {
            Some(wanted) => items
                .into_iter()
                .filter(|item| status_matches(item, wanted))
                .collect(),
            None => items,
        })
    }

    /// Returns items matching the search query.
    ///
    /// # Errors
    ///
    /// Returns [`BoardQueryError::Gateway`] when the listing fails.
    pub async fn search(
        &self,
        board_id: &BoardId,
        query: &SearchQuery,
    ) -> BoardQueryResult<Vec<BoardItem>> {
        let items = self.gateway.list_items(board_id).await?;
        Ok(items.into_iter().filter(|item| query.matches(item)).collect())
    }

    /// Builds item references carrying each item's linked issue.
    ///
    /// Identifiers not found on the board are returned without a link; the
    /// update itself reports them as missing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardQueryError::Gateway`] when the listing fails.
    pub async fn item_refs(
        &self,
        board_id: &BoardId,
        item_ids: &[ItemId],
    ) -> BoardQueryResult<Vec<ItemRef>> {
        let items = self.gateway.list_items(board_id).await?;
        let by_id: HashMap<&ItemId, &BoardItem> = items.iter().map(|item| (item.id(), item)).collect();
        Ok(item_ids
            .iter()
            .map(|item_id| {
                by_id.get(item_id).map_or_else(
                    || {
                        debug!(item = %item_id, "item not listed on board, no linked issue");
                        ItemRef::new(item_id.clone())
                    },
                    |item| item.to_item_ref(),
                )
            })
            .collect())
    }
}
