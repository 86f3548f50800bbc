//! Subcommand execution over the board ports.

use super::cli::Command;
use boardctl::board::{
    adapters::github::GitHubClientError,
    domain::{BoardDomainError, BoardId, BoardItem, IssueUrl, ItemId, ItemRef, OperationError},
    ports::{BoardGateway, IssueCommenter},
    services::{
        AuditAnnotator, BatchError, BatchOrchestrator, BatchRequest, BoardQueryError,
        BoardQueryService, OrchestratorConfig, SearchQuery, group_by_status,
    },
};
use boardctl::config::ConfigError;
use mockable::DefaultClock;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Failures that stop a command before it produces a report.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The GitHub client could not be built.
    #[error(transparent)]
    Client(#[from] GitHubClientError),
    /// A command-line argument is malformed.
    #[error("invalid argument: {0}")]
    Argument(#[from] BoardDomainError),
    /// The batch could not start.
    #[error(transparent)]
    Batch(#[from] BatchError),
    /// A board query failed.
    #[error(transparent)]
    Query(#[from] BoardQueryError),
    /// A single remote operation failed.
    #[error(transparent)]
    Operation(#[from] OperationError),
    /// Writing the report failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// How a command that ran to completion should exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Everything requested succeeded, or the batch partly succeeded.
    Success,
    /// Every item of a non-empty batch failed.
    BatchFailed,
}

/// Shared state for one invocation.
pub struct Context<G, C>
where
    G: BoardGateway,
    C: IssueCommenter,
{
    gateway: Arc<G>,
    commenter: Arc<C>,
    board_id: Option<BoardId>,
    field: String,
    orchestrator: OrchestratorConfig,
    cancel: CancellationToken,
}

impl<G, C> Context<G, C>
where
    G: BoardGateway,
    C: IssueCommenter,
{
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        commenter: Arc<C>,
        board_id: Option<BoardId>,
        field: impl Into<String>,
        orchestrator: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            commenter,
            board_id,
            field: field.into(),
            orchestrator,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn board_id(&self) -> Result<&BoardId, CliError> {
        self.board_id.as_ref().ok_or(CliError::Config(ConfigError::Missing {
            variable: boardctl::config::PROJECT_ID_VAR,
        }))
    }

    fn queries(&self) -> BoardQueryService<G> {
        BoardQueryService::new(Arc::clone(&self.gateway))
    }
}

/// Runs `command`, writing its report to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when the command cannot run or its output cannot be
/// written. Per-item batch failures are part of the report instead.
pub async fn execute<G, C, W>(
    ctx: &Context<G, C>,
    command: &Command,
    out: &mut W,
) -> Result<Completion, CliError>
where
    G: BoardGateway,
    C: IssueCommenter,
    W: Write,
{
    match command {
        Command::Move {
            item_id,
            status,
            comment,
        } => {
            let ids = [ItemId::new(item_id.as_str())?];
            move_items(ctx, &ids, status, comment.as_deref(), out).await
        }
        Command::BatchMove {
            item_ids,
            status,
            comment,
        } => {
            let ids = item_ids
                .iter()
                .map(|raw| ItemId::new(raw.as_str()))
                .collect::<Result<Vec<_>, _>>()?;
            move_items(ctx, &ids, status, comment.as_deref(), out).await
        }
        Command::Statuses => {
            let statuses = ctx.queries().statuses(ctx.board_id()?).await?;
            if statuses.is_empty() {
                warn!("board has no single-select Status field");
            }
            for status in statuses {
                writeln!(out, "{status}")?;
            }
            Ok(Completion::Success)
        }
        Command::Comment { issue_url, message } => {
            let issue = IssueUrl::parse(issue_url)?;
            let annotator =
                AuditAnnotator::new(Arc::clone(&ctx.commenter), ctx.orchestrator.retry);
            let comment_id = annotator.annotate(&issue, message, &ctx.cancel).await?;
            writeln!(out, "comment {comment_id} posted on {issue}")?;
            Ok(Completion::Success)
        }
        Command::List { status_filter } => {
            let items = ctx
                .queries()
                .list_items(ctx.board_id()?, status_filter.as_deref())
                .await?;
            write_grouped(&items, out)?;
            Ok(Completion::Success)
        }
        Command::Search {
            terms,
            status_filter,
            exact,
        } => {
            let joined = terms.join(" ");
            let mut query = if *exact {
                SearchQuery::phrase(joined)
            } else {
                SearchQuery::keywords(joined)
            };
            if let Some(status) = status_filter {
                query = query.with_status(status.as_str());
            }
            let items = ctx.queries().search(ctx.board_id()?, &query).await?;
            write_grouped(&items, out)?;
            Ok(Completion::Success)
        }
    }
}

async fn move_items<G, C, W>(
    ctx: &Context<G, C>,
    ids: &[ItemId],
    value: &str,
    comment: Option<&str>,
    out: &mut W,
) -> Result<Completion, CliError>
where
    G: BoardGateway,
    C: IssueCommenter,
    W: Write,
{
    let board_id = ctx.board_id()?;
    let comment = comment.filter(|text| !text.trim().is_empty());

    let orchestrator = BatchOrchestrator::new(
        Arc::clone(&ctx.gateway),
        Arc::clone(&ctx.commenter),
        Arc::new(DefaultClock),
        ctx.orchestrator,
    );

    // Linked issues are only needed to post comments, and the listing is
    // only worth paying for once the target resolves.
    let items: Vec<ItemRef> = if comment.is_some() {
        orchestrator
            .resolve_target(board_id, ctx.field.as_str(), value)
            .await?;
        ctx.queries().item_refs(board_id, ids).await?
    } else {
        ids.iter().cloned().map(ItemRef::from).collect()
    };

    let mut request = BatchRequest::new(board_id.clone(), items, ctx.field.as_str(), value);
    if let Some(text) = comment {
        request = request.with_comment(text);
    }
    let report = orchestrator
        .run_with_cancellation(&request, &ctx.cancel)
        .await?;

    write!(out, "{report}")?;
    Ok(if report.all_failed() {
        Completion::BatchFailed
    } else {
        Completion::Success
    })
}

fn write_grouped<W: Write>(items: &[BoardItem], out: &mut W) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "no matching items");
    }
    for group in group_by_status(items) {
        writeln!(out, "{} ({})", group.status, group.items.len())?;
        for item in &group.items {
            match item.number() {
                Some(number) => writeln!(out, "  #{number} {} [{}]", item.title(), item.id())?,
                None => writeln!(out, "  {} [{}]", item.title(), item.id())?,
            }
        }
    }
    Ok(())
}
