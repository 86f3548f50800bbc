//! Opaque node identifiers issued by the remote board.
//!
//! The remote system hands out string node IDs (`PVT_…`, `PVTI_…`,
//! `PVTSSF_…`) that are meaningless to humans. Each kind gets its own newtype
//! so a field ID can never be passed where an item ID is expected.

use super::BoardDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns [`BoardDomainError::EmptyIdentifier`] when the value is
            /// empty after trimming.
            pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
                let raw = value.into();
                let normalized = raw.trim();
                if normalized.is_empty() {
                    return Err(BoardDomainError::EmptyIdentifier { kind: $kind });
                }
                Ok(Self(normalized.to_owned()))
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<&str> for $name {
            type Error = BoardDomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

node_id!(
    /// Node identifier of a project board.
    BoardId,
    "board"
);

node_id!(
    /// Node identifier of one item (row) on a board.
    ItemId,
    "item"
);

node_id!(
    /// Node identifier of a board field (column).
    FieldId,
    "field"
);

node_id!(
    /// Identifier of one option of a single-select field.
    OptionId,
    "option"
);

/// Numeric identifier of a posted issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(u64);

impl CommentId {
    /// Wraps a remote comment identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
