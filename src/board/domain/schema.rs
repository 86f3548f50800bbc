//! Board schema snapshot: fields, their kinds and single-select options.

use super::{BoardDomainError, BoardId, FieldId, OptionId, names_match};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the single-select field that models an item's status column.
pub const STATUS_FIELD: &str = "Status";

/// Data type of a board field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
    /// Calendar date.
    Date,
    /// One option out of a closed set.
    SingleSelect,
    /// Iteration (sprint) assignment; read-only here.
    Iteration,
}

impl FieldKind {
    /// Returns the kind in the remote schema's `dataType` spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Number => "NUMBER",
            Self::Date => "DATE",
            Self::SingleSelect => "SINGLE_SELECT",
            Self::Iteration => "ITERATION",
        }
    }
}

impl TryFrom<&str> for FieldKind {
    type Error = BoardDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "TEXT" => Ok(Self::Text),
            "NUMBER" => Ok(Self::Number),
            "DATE" => Ok(Self::Date),
            "SINGLE_SELECT" => Ok(Self::SingleSelect),
            "ITERATION" => Ok(Self::Iteration),
            _ => Err(BoardDomainError::UnknownFieldKind(value.to_owned())),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One named choice of a single-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    id: OptionId,
    name: String,
}

impl OptionDescriptor {
    /// Creates an option descriptor.
    #[must_use]
    pub fn new(id: OptionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the option identifier.
    #[must_use]
    pub const fn id(&self) -> &OptionId {
        &self.id
    }

    /// Returns the option's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A named, typed field of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    id: FieldId,
    name: String,
    kind: FieldKind,
    options: Vec<OptionDescriptor>,
}

impl FieldDescriptor {
    /// Creates a field descriptor without options.
    #[must_use]
    pub fn new(id: FieldId, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            options: Vec::new(),
        }
    }

    /// Creates a single-select field with its option set.
    #[must_use]
    pub fn single_select(
        id: FieldId,
        name: impl Into<String>,
        options: impl IntoIterator<Item = OptionDescriptor>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: FieldKind::SingleSelect,
            options: options.into_iter().collect(),
        }
    }

    /// Attaches options to the field.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::OptionsOnNonSelectField`] when options are
    /// supplied for a field that is not single-select.
    pub fn with_options(
        mut self,
        options: impl IntoIterator<Item = OptionDescriptor>,
    ) -> Result<Self, BoardDomainError> {
        let collected: Vec<OptionDescriptor> = options.into_iter().collect();
        if !collected.is_empty() && self.kind != FieldKind::SingleSelect {
            return Err(BoardDomainError::OptionsOnNonSelectField {
                field: self.name,
                kind: self.kind,
            });
        }
        self.options = collected;
        Ok(self)
    }

    /// Returns the field identifier.
    #[must_use]
    pub const fn id(&self) -> &FieldId {
        &self.id
    }

    /// Returns the field's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the options, empty unless the field is single-select.
    #[must_use]
    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    /// Finds an option by case-insensitive name.
    #[must_use]
    pub fn find_option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options
            .iter()
            .find(|option| names_match(option.name(), name))
    }

    /// Returns option names in board order.
    #[must_use]
    pub fn option_names(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|option| option.name().to_owned())
            .collect()
    }
}

/// Immutable snapshot of one board's field metadata.
///
/// A snapshot is fetched fresh for every orchestration run and shared
/// read-only between the workers of that run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSchema {
    board_id: BoardId,
    title: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl BoardSchema {
    /// Creates a schema snapshot.
    #[must_use]
    pub fn new(board_id: BoardId, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            board_id,
            title: None,
            fields: fields.into_iter().collect(),
        }
    }

    /// Sets the board title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// Returns the board title when known.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns every field in board order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Finds a field by case-insensitive name.
    ///
    /// Field names are unique on a well-formed board; when they are not, the
    /// first match in board order is returned.
    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| names_match(field.name(), name))
    }

    /// Returns field names in board order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| field.name().to_owned())
            .collect()
    }

    /// Returns the option names of the single-select status field, or an
    /// empty list when the board has none.
    #[must_use]
    pub fn status_options(&self) -> Vec<String> {
        self.find_field(STATUS_FIELD)
            .filter(|field| field.kind() == FieldKind::SingleSelect)
            .map(FieldDescriptor::option_names)
            .unwrap_or_default()
    }
}
