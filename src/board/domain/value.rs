//! Typed field values accepted by the update mutation.

use super::{FieldKind, OptionId};
use chrono::NaiveDate;
use std::fmt;

/// A field value ready to be written, tagged with the kind of field it
/// belongs to.
///
/// Iteration fields are read-only and therefore have no variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Free text.
    Text(String),
    /// Finite number.
    Number(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Chosen option of a single-select field.
    SingleSelect(OptionId),
}

impl TypedValue {
    /// Returns the kind of field this value can be written to.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Date(_) => FieldKind::Date,
            Self::SingleSelect(_) => FieldKind::SingleSelect,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::SingleSelect(option_id) => write!(f, "option {option_id}"),
        }
    }
}
