//! Port contracts for project board access.
//!
//! Ports define transport-agnostic interfaces used by board services.

pub mod comments;
pub mod gateway;

pub use comments::IssueCommenter;
pub use gateway::{BoardGateway, GatewayError, GatewayResult};
