//! GraphQL documents and response models for Projects v2.

use crate::board::domain::{
    BoardId, BoardItem, BoardSchema, FieldDescriptor, FieldId, FieldKind, IssueUrl, ItemId,
    OptionDescriptor, OptionId, TypedValue,
};
use crate::board::ports::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

pub(super) const BOARD_SCHEMA_QUERY: &str = r"
query BoardSchema($boardId: ID!) {
  node(id: $boardId) {
    ... on ProjectV2 {
      id
      title
      fields(first: 100) {
        nodes {
          ... on ProjectV2Field { id name dataType }
          ... on ProjectV2SingleSelectField { id name dataType options { id name } }
          ... on ProjectV2IterationField { id name dataType }
        }
      }
    }
  }
}
";

pub(super) const BOARD_ITEMS_QUERY: &str = r#"
query BoardItems($boardId: ID!, $cursor: String) {
  node(id: $boardId) {
    ... on ProjectV2 {
      id
      items(first: 100, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          content {
            ... on Issue { title number body url }
            ... on PullRequest { title number body url }
            ... on DraftIssue { title body }
          }
          status: fieldValueByName(name: "Status") {
            ... on ProjectV2ItemFieldSingleSelectValue { name }
          }
        }
      }
    }
  }
}
"#;

pub(super) const UPDATE_FIELD_MUTATION: &str = r"
mutation UpdateItemField($boardId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: { projectId: $boardId, itemId: $itemId, fieldId: $fieldId, value: $value }
  ) {
    projectV2Item { id }
  }
}
";

/// GraphQL request body.
#[derive(Debug, Serialize)]
pub(super) struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One GraphQL error entry.
#[derive(Debug, Deserialize)]
pub(super) struct GraphQlError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Maps GraphQL error entries to a gateway error, classified by the first
/// entry's type.
pub(super) fn classify_graphql_errors(errors: &[GraphQlError]) -> GatewayError {
    let message = errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    match errors.first().and_then(|error| error.kind.as_deref()) {
        Some("NOT_FOUND") => GatewayError::NotFound(message),
        Some("FORBIDDEN" | "INSUFFICIENT_SCOPES") => GatewayError::Unauthorized(message),
        Some("RATE_LIMITED") => GatewayError::RateLimited {
            message,
            retry_after: None,
        },
        _ => GatewayError::Rejected(message),
    }
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SchemaData {
    node: Option<SchemaNode>,
}

#[derive(Debug, Deserialize)]
struct SchemaNode {
    id: Option<String>,
    title: Option<String>,
    fields: Option<Connection<FieldNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldNode {
    id: Option<String>,
    name: Option<String>,
    data_type: Option<String>,
    #[serde(default)]
    options: Vec<OptionNode>,
}

#[derive(Debug, Deserialize)]
struct OptionNode {
    id: String,
    name: String,
}

impl SchemaData {
    /// Converts the response into a schema snapshot.
    ///
    /// Fields of kinds the board cannot write through this tool (title,
    /// assignees, labels and the like) are left out.
    pub(super) fn into_schema(self, board_id: &BoardId) -> GatewayResult<BoardSchema> {
        let node = self
            .node
            .filter(|node| node.id.is_some())
            .ok_or_else(|| GatewayError::NotFound(format!("project board {board_id}")))?;

        let fields = node
            .fields
            .map(|connection| connection.nodes)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(into_field_descriptor)
            .collect::<Vec<_>>();

        let schema = BoardSchema::new(board_id.clone(), fields);
        Ok(match node.title {
            Some(title) => schema.with_title(title),
            None => schema,
        })
    }
}

fn into_field_descriptor(node: FieldNode) -> Option<FieldDescriptor> {
    let (Some(raw_id), Some(name), Some(data_type)) = (node.id, node.name, node.data_type) else {
        return None;
    };
    let Ok(kind) = FieldKind::try_from(data_type.as_str()) else {
        debug!(field = %name, data_type = %data_type, "skipping field of unsupported kind");
        return None;
    };
    let id = FieldId::new(raw_id).ok()?;
    let options = node
        .options
        .into_iter()
        .filter_map(|option| {
            OptionId::new(option.id)
                .ok()
                .map(|option_id| OptionDescriptor::new(option_id, option.name))
        })
        .collect::<Vec<_>>();
    FieldDescriptor::new(id, name, kind).with_options(options).ok()
}

#[derive(Debug, Deserialize)]
pub(super) struct ItemsData {
    node: Option<ItemsNode>,
}

#[derive(Debug, Deserialize)]
struct ItemsNode {
    id: Option<String>,
    items: Option<ItemsPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsPage {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<ItemNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemNode {
    id: String,
    content: Option<ContentNode>,
    status: Option<StatusValue>,
}

#[derive(Debug, Deserialize)]
struct ContentNode {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    name: Option<String>,
}

/// One page of listed items plus the cursor of the next page.
pub(super) struct ItemsPageResult {
    pub items: Vec<BoardItem>,
    pub next_cursor: Option<String>,
}

impl ItemsData {
    /// Converts one response page into board items.
    pub(super) fn into_page(self, board_id: &BoardId) -> GatewayResult<ItemsPageResult> {
        let page = self
            .node
            .filter(|node| node.id.is_some())
            .and_then(|node| node.items)
            .ok_or_else(|| GatewayError::NotFound(format!("project board {board_id}")))?;

        let next_cursor = page
            .page_info
            .end_cursor
            .filter(|_| page.page_info.has_next_page);
        let items = page
            .nodes
            .into_iter()
            .flatten()
            .filter_map(into_board_item)
            .collect();
        Ok(ItemsPageResult { items, next_cursor })
    }
}

fn into_board_item(node: ItemNode) -> Option<BoardItem> {
    let id = ItemId::new(node.id).ok()?;
    let content = node.content.unwrap_or(ContentNode {
        title: None,
        body: None,
        url: None,
    });
    let mut item = BoardItem::new(id, content.title.unwrap_or_default());
    if let Some(url) = content.url.as_deref() {
        match IssueUrl::parse(url) {
            Ok(issue) => item = item.with_issue(issue),
            Err(error) => debug!(%error, "ignoring unparseable content URL"),
        }
    }
    if let Some(body) = content.body.filter(|body| !body.is_empty()) {
        item = item.with_body(body);
    }
    if let Some(status) = node.status.and_then(|value| value.name) {
        item = item.with_status(status);
    }
    Some(item)
}

/// Serializes a typed value as a `ProjectV2FieldValue` input object.
pub(super) fn field_value_input(value: &TypedValue) -> Value {
    match value {
        TypedValue::Text(text) => json!({ "text": text }),
        TypedValue::Number(number) => json!({ "number": number }),
        TypedValue::Date(date) => json!({ "date": date.format("%Y-%m-%d").to_string() }),
        TypedValue::SingleSelect(option_id) => {
            json!({ "singleSelectOptionId": option_id.as_str() })
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateFieldData {
    update_project_v2_item_field_value: Option<UpdatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload {
    project_v2_item: Option<UpdatedItem>,
}

#[derive(Debug, Deserialize)]
struct UpdatedItem {
    id: String,
}

impl UpdateFieldData {
    /// Returns the updated item's identifier.
    pub(super) fn into_item_id(self, requested: &ItemId) -> GatewayResult<ItemId> {
        let updated = self
            .update_project_v2_item_field_value
            .and_then(|payload| payload.project_v2_item)
            .ok_or_else(|| GatewayError::NotFound(format!("item {requested}")))?;
        ItemId::new(updated.id).map_err(|err| GatewayError::Rejected(err.to_string()))
    }
}

/// Issue comment response from the REST API.
#[derive(Debug, Deserialize)]
pub(super) struct CreatedComment {
    pub id: u64,
}
