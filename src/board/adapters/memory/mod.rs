//! In-memory board adapter for tests and dry runs.

mod board;

pub use board::InMemoryBoard;
