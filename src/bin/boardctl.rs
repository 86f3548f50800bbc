//! `boardctl`: move GitHub project board items between statuses.
//!
//! Usage:
//!
//! ```text
//! boardctl [--project-id <ID>] [--field <NAME>] <command>
//! ```
//!
//! Commands are `move`, `batch-move`, `statuses`, `comment`, `list` and
//! `search`. `GITHUB_TOKEN` must be set; see [`boardctl::config`] for the
//! other variables. Reports go to stdout and logs to stderr.
//!
//! The process exits with status 1 when every item of a batch failed and
//! with status 2 when a command could not run at all.

#[path = "boardctl/cli.rs"]
mod cli;
#[path = "boardctl/commands.rs"]
mod commands;

#[cfg(test)]
#[path = "boardctl/tests.rs"]
mod tests;

use boardctl::board::adapters::github::GitHubClient;
use boardctl::board::domain::BoardId;
use boardctl::config::BoardConfig;
use clap::Parser;
use cli::{Cli, LogFormat};
use commands::{CliError, Completion, Context, execute};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "boardctl=info";
const BATCH_FAILED: u8 = 1;
const COMMAND_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(Completion::Success) => ExitCode::SUCCESS,
        Ok(Completion::BatchFailed) => ExitCode::from(BATCH_FAILED),
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::from(COMMAND_FAILED)
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<Completion, CliError> {
    let mut config = BoardConfig::from_env()?;
    if let Some(raw) = cli.project_id.as_deref() {
        config = config.with_project_id(BoardId::new(raw)?);
    }
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }

    let client = Arc::new(GitHubClient::with_endpoints(
        config.token(),
        config.graphql_url(),
        config.rest_url(),
    )?);
    let ctx = Context::new(
        Arc::clone(&client),
        client,
        config.project_id().cloned(),
        cli.field,
        config.orchestrator(),
    )
    .with_cancellation(interrupt_token());

    let mut stdout = io::stdout().lock();
    execute(&ctx, &cli.command, &mut stdout).await
}

/// Cancels the returned token on Ctrl-C; in-flight items still finish.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight items");
            trigger.cancel();
        }
    });
    cancel
}
