//! GitHub Projects v2 adapter.
//!
//! Board reads and field updates go through the GraphQL API; audit comments
//! go through the REST issues API.

mod client;
mod graphql;

pub use client::{
    DEFAULT_GRAPHQL_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_REST_URL, GitHubClient, GitHubClientError,
};
