//! Project board field resolution and batch item moves.
//!
//! This module turns human-readable field and option names into the opaque
//! identifiers a remote project board requires, applies field updates with
//! retry, and coordinates many updates as one best-effort batch with optional
//! audit comments. The module follows hexagonal architecture:
//!
//! - Domain types and the field value resolver in [`domain`]
//! - Port contracts for the remote board and issue comments in [`ports`]
//! - In-memory and GitHub adapters in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
