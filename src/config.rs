//! Runtime configuration read from the process environment.
//!
//! Values are read through a lookup function so tests can supply a fixed
//! map instead of touching the real environment.

use crate::board::adapters::github::{DEFAULT_GRAPHQL_URL, DEFAULT_REST_URL};
use crate::board::domain::BoardId;
use crate::board::services::{OrchestratorConfig, RetryPolicy};
use std::fmt;
use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;
use thiserror::Error;

/// Personal access or app token.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Default project board node ID.
pub const PROJECT_ID_VAR: &str = "GITHUB_PROJECT_ID";
/// GraphQL endpoint override.
pub const GRAPHQL_URL_VAR: &str = "GITHUB_GRAPHQL_URL";
/// REST API root override.
pub const REST_URL_VAR: &str = "GITHUB_API_URL";
/// Maximum items processed at once.
pub const CONCURRENCY_VAR: &str = "BOARDCTL_CONCURRENCY";
/// Attempts per remote call, including the first.
pub const MAX_ATTEMPTS_VAR: &str = "BOARDCTL_MAX_ATTEMPTS";
/// First retry delay in milliseconds.
pub const BASE_DELAY_MS_VAR: &str = "BOARDCTL_BASE_DELAY_MS";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{variable} is not set")]
    Missing {
        /// Variable name.
        variable: &'static str,
    },
    /// A variable holds a value that cannot be used.
    #[error("{variable} has invalid value {value:?}: {reason}")]
    Invalid {
        /// Variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Immutable settings for one CLI invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct BoardConfig {
    token: String,
    project_id: Option<BoardId>,
    graphql_url: String,
    rest_url: String,
    orchestrator: OrchestratorConfig,
}

impl fmt::Debug for BoardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardConfig")
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("graphql_url", &self.graphql_url)
            .field("rest_url", &self.rest_url)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

impl BoardConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    /// when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the token is absent and
    /// [`ConfigError::Invalid`] when any variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let token = read(TOKEN_VAR).ok_or(ConfigError::Missing {
            variable: TOKEN_VAR,
        })?;
        let project_id = read(PROJECT_ID_VAR)
            .map(|raw| {
                BoardId::new(raw.clone()).map_err(|err| invalid(PROJECT_ID_VAR, raw, &err))
            })
            .transpose()?;

        let mut orchestrator = OrchestratorConfig::default();
        if let Some(raw) = read(CONCURRENCY_VAR) {
            orchestrator.concurrency = parse_non_zero::<NonZeroUsize>(CONCURRENCY_VAR, raw)?;
        }
        let defaults = RetryPolicy::default();
        let max_attempts = match read(MAX_ATTEMPTS_VAR) {
            Some(raw) => parse_non_zero::<NonZeroU32>(MAX_ATTEMPTS_VAR, raw)?,
            None => defaults.max_attempts(),
        };
        let base_delay = match read(BASE_DELAY_MS_VAR) {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|err| invalid(BASE_DELAY_MS_VAR, raw, &err))?,
            None => defaults.base_delay(),
        };
        orchestrator.retry = RetryPolicy::new(max_attempts, base_delay);

        Ok(Self {
            token,
            project_id,
            graphql_url: read(GRAPHQL_URL_VAR).unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_owned()),
            rest_url: read(REST_URL_VAR).unwrap_or_else(|| DEFAULT_REST_URL.to_owned()),
            orchestrator,
        })
    }

    /// Replaces the project board, as done by `--project-id`.
    #[must_use]
    pub fn with_project_id(mut self, project_id: BoardId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Replaces the concurrency limit.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.orchestrator.concurrency = concurrency;
        self
    }

    /// Returns the API token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the configured board, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<&BoardId> {
        self.project_id.as_ref()
    }

    /// Returns the configured board.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when no board was configured.
    pub fn require_project_id(&self) -> Result<&BoardId, ConfigError> {
        self.project_id.as_ref().ok_or(ConfigError::Missing {
            variable: PROJECT_ID_VAR,
        })
    }

    /// Returns the GraphQL endpoint.
    #[must_use]
    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Returns the REST API root.
    #[must_use]
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    /// Returns the batch tuning.
    #[must_use]
    pub const fn orchestrator(&self) -> OrchestratorConfig {
        self.orchestrator
    }
}

fn invalid(variable: &'static str, value: String, reason: &impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        variable,
        value,
        reason: reason.to_string(),
    }
}

fn parse_non_zero<T>(variable: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw.parse::<T>() {
        Ok(value) => Ok(value),
        Err(err) => Err(invalid(variable, raw, &err)),
    }
}
