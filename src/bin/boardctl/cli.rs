//! Command-line surface.

use boardctl::board::domain::STATUS_FIELD;
use clap::{Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;

/// Move GitHub project board items between statuses.
#[derive(Debug, Parser)]
#[command(name = "boardctl", version, about)]
pub struct Cli {
    /// Project board node ID (or set `GITHUB_PROJECT_ID`).
    #[arg(long, env = "GITHUB_PROJECT_ID", global = true)]
    pub project_id: Option<String>,

    /// Field written by `move` and `batch-move`.
    #[arg(long, default_value = STATUS_FIELD, global = true)]
    pub field: String,

    /// Maximum number of items updated at once.
    #[arg(long, global = true)]
    pub concurrency: Option<NonZeroUsize>,

    /// Log output format; logs go to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move one item to a status.
    Move {
        /// Project item node ID.
        #[arg(long)]
        item_id: String,
        /// Target option name, matched case-insensitively.
        #[arg(long, alias = "value")]
        status: String,
        /// Comment posted on the item's linked issue.
        #[arg(long)]
        comment: Option<String>,
    },

    /// Move several items to the same status.
    BatchMove {
        /// Project item node IDs, space or comma separated.
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        item_ids: Vec<String>,
        /// Target option name, matched case-insensitively.
        #[arg(long, alias = "value")]
        status: String,
        /// Comment posted on each item's linked issue.
        #[arg(long)]
        comment: Option<String>,
    },

    /// List the options of the status field.
    Statuses,

    /// Post a comment on an issue or pull request.
    Comment {
        /// Issue or pull request URL.
        #[arg(long)]
        issue_url: String,
        /// Comment body.
        #[arg(long)]
        message: String,
    },

    /// List board items grouped by status.
    List {
        /// Only show items with this status.
        #[arg(long)]
        status_filter: Option<String>,
    },

    /// Search items by keywords or an exact phrase.
    Search {
        /// Keywords; every one must appear in the title, or every one in the body.
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
        /// Only show items with this status.
        #[arg(long)]
        status_filter: Option<String>,
        /// Match the terms as one exact phrase.
        #[arg(long)]
        exact: bool,
    },
}
