//! HTTP client implementing the board and comment ports against GitHub.

use super::graphql::{
    BOARD_ITEMS_QUERY, BOARD_SCHEMA_QUERY, CreatedComment, GraphQlRequest, GraphQlResponse,
    ItemsData, SchemaData, UPDATE_FIELD_MUTATION, UpdateFieldData, classify_graphql_errors,
    field_value_input,
};
use crate::board::domain::{
    BoardId, BoardItem, BoardSchema, CommentId, FieldId, IssueUrl, ItemId, TypedValue,
};
use crate::board::ports::{BoardGateway, GatewayError, GatewayResult, IssueCommenter};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Public GitHub GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
/// Public GitHub REST API root.
pub const DEFAULT_REST_URL: &str = "https://api.github.com";

/// Upper bound on a single GraphQL or REST call, connection included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Errors raised while constructing a [`GitHubClient`].
#[derive(Debug, Error)]
pub enum GitHubClientError {
    /// The token cannot be used as a header value.
    #[error("token contains characters not allowed in an HTTP header")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// GitHub Projects v2 client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    graphql_url: String,
    rest_url: String,
}

impl GitHubClient {
    /// Creates a client for the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubClientError`] when the token is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self, GitHubClientError> {
        Self::with_endpoints(token, DEFAULT_GRAPHQL_URL, DEFAULT_REST_URL)
    }

    /// Creates a client for custom endpoints, such as GitHub Enterprise or a
    /// local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubClientError`] when the token is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn with_endpoints(
        token: &str,
        graphql_url: impl Into<String>,
        rest_url: impl Into<String>,
    ) -> Result<Self, GitHubClientError> {
        Self::with_timeout(token, graphql_url, rest_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a client for custom endpoints whose calls give up after
    /// `request_timeout`.
    ///
    /// A call that times out fails with [`GatewayError::Network`], so the
    /// retry policy treats it like any other transient failure.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubClientError`] when the token is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn with_timeout(
        token: &str,
        graphql_url: impl Into<String>,
        rest_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, GitHubClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(env!("CARGO_PKG_NAME")));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http,
            graphql_url: graphql_url.into(),
            rest_url: rest_url.into().trim_end_matches('/').to_owned(),
        })
    }

    async fn execute<V, R>(&self, query: &str, variables: V) -> GatewayResult<R>
    where
        V: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = GraphQlRequest { query, variables };
        let response = self
            .http
            .post(&self.graphql_url)
            .json(&request)
            .send()
            .await
            .map_err(|err| transport_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &headers, body));
        }

        let envelope: GraphQlResponse<R> = response
            .json()
            .await
            .map_err(|err| GatewayError::Rejected(format!("malformed GraphQL response: {err}")))?;
        if !envelope.errors.is_empty() {
            return Err(classify_graphql_errors(&envelope.errors));
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::Rejected("GraphQL response carried no data".to_owned()))
    }
}

#[async_trait]
impl BoardGateway for GitHubClient {
    #[instrument(skip_all, fields(board = %board_id))]
    async fn fetch_schema(&self, board_id: &BoardId) -> GatewayResult<BoardSchema> {
        let data: SchemaData = self
            .execute(BOARD_SCHEMA_QUERY, json!({ "boardId": board_id.as_str() }))
            .await?;
        let schema = data.into_schema(board_id)?;
        debug!(fields = schema.fields().len(), "fetched board schema");
        Ok(schema)
    }

    #[instrument(skip_all, fields(board = %board_id, item = %item_id, field = %field_id))]
    async fn apply_field_value(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        field_id: &FieldId,
        value: &TypedValue,
    ) -> GatewayResult<ItemId> {
        let variables = json!({
            "boardId": board_id.as_str(),
            "itemId": item_id.as_str(),
            "fieldId": field_id.as_str(),
            "value": field_value_input(value),
        });
        let data: UpdateFieldData = self.execute(UPDATE_FIELD_MUTATION, variables).await?;
        data.into_item_id(item_id)
    }

    #[instrument(skip_all, fields(board = %board_id))]
    async fn list_items(&self, board_id: &BoardId) -> GatewayResult<Vec<BoardItem>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let variables = json!({ "boardId": board_id.as_str(), "cursor": cursor });
            let data: ItemsData = self.execute(BOARD_ITEMS_QUERY, variables).await?;
            let page = data.into_page(board_id)?;
            items.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        debug!(count = items.len(), "listed board items");
        Ok(items)
    }
}

#[async_trait]
impl IssueCommenter for GitHubClient {
    #[instrument(skip_all, fields(issue = %issue))]
    async fn post_comment(&self, issue: &IssueUrl, body: &str) -> GatewayResult<CommentId> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.rest_url,
            issue.owner(),
            issue.repository(),
            issue.number()
        );
        let response = self
            .http
            .post(&url)
            .json(&json!({ "body": body }))
            .send()
            .await
            .map_err(|err| transport_error(&err))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &headers, text));
        }
        let created: CreatedComment = response
            .json()
            .await
            .map_err(|err| GatewayError::Rejected(format!("malformed comment response: {err}")))?;
        Ok(CommentId::new(created.id))
    }
}

fn transport_error(error: &reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        return GatewayError::Network(format!("request timed out: {error}"));
    }
    GatewayError::Network(error.to_string())
}

/// Maps a non-success HTTP response to a gateway error.
fn classify_status(status: StatusCode, headers: &HeaderMap, body: String) -> GatewayError {
    let message = error_message(status, body);
    let retry_after = retry_after(headers);
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized(message),
        StatusCode::FORBIDDEN if is_rate_limited(headers) => GatewayError::RateLimited {
            message,
            retry_after,
        },
        StatusCode::FORBIDDEN => GatewayError::Unauthorized(message),
        StatusCode::NOT_FOUND => GatewayError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited {
            message,
            retry_after,
        },
        server if server.is_server_error() => GatewayError::Network(message),
        _ => GatewayError::Rejected(message),
    }
}

fn is_rate_limited(headers: &HeaderMap) -> bool {
    let exhausted = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|remaining| remaining.trim() == "0");
    exhausted || headers.contains_key(RETRY_AFTER)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|seconds| seconds.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Prefers the `message` field of GitHub's JSON error bodies.
fn error_message(status: StatusCode, body: String) -> String {
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or(body);
    if detail.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {detail}")
    }
}
