//! Unit tests for the board module.
//!
//! Tests are organised by component: domain types, the field value
//! resolver, retry behaviour, batch orchestration and board queries.
