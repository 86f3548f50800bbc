//! Boardctl: GitHub Projects v2 status and field automation.
//!
//! This crate resolves human-readable field values against a project board's
//! schema and applies them to many items at once, optionally recording each
//! transition as a comment on the item's linked issue.
//!
//! # Architecture
//!
//! Boardctl follows hexagonal architecture principles:
//!
//! - **Domain**: Schema snapshots, typed values and batch outcomes
//! - **Ports**: Abstract trait interfaces for the remote board and comments
//! - **Adapters**: The GitHub API client and an in-memory board
//!
//! # Modules
//!
//! - [`board`]: Field resolution, mutation retry and batch orchestration
//! - [`config`]: Environment-driven runtime configuration

pub mod board;
pub mod config;
