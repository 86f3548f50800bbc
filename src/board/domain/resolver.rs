//! Resolution of human-readable field targets into typed values.

use super::{BoardSchema, FieldId, FieldKind, ResolutionError, TypedValue};
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A field target resolved against a board schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFieldValue {
    field_id: FieldId,
    field_name: String,
    value: TypedValue,
}

impl ResolvedFieldValue {
    /// Returns the identifier of the target field.
    #[must_use]
    pub const fn field_id(&self) -> &FieldId {
        &self.field_id
    }

    /// Returns the field name as the board spells it.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the typed value to write.
    #[must_use]
    pub const fn value(&self) -> &TypedValue {
        &self.value
    }
}

/// Resolves `raw_value` for the field called `field_name`.
///
/// Field and option names match case-insensitively. Resolution only reads the
/// snapshot, so it is safe to call repeatedly.
///
/// # Errors
///
/// Returns [`ResolutionError::FieldNotFound`] when no field matches,
/// [`ResolutionError::InvalidValue`] when the value does not parse for the
/// field's kind or names no option, and [`ResolutionError::UnsupportedField`]
/// for read-only iteration fields.
pub fn resolve(
    schema: &BoardSchema,
    field_name: &str,
    raw_value: &str,
) -> Result<ResolvedFieldValue, ResolutionError> {
    let field = schema
        .find_field(field_name)
        .ok_or_else(|| ResolutionError::FieldNotFound {
            field_name: field_name.to_owned(),
            available_fields: schema.field_names(),
        })?;

    let invalid = |reason: &str, available_options: Vec<String>| ResolutionError::InvalidValue {
        field_name: field.name().to_owned(),
        raw_value: raw_value.to_owned(),
        reason: reason.to_owned(),
        available_options,
    };

    let value = match field.kind() {
        FieldKind::Text => TypedValue::Text(raw_value.to_owned()),
        FieldKind::Number => {
            let number = raw_value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite())
                .ok_or_else(|| invalid("expected a finite number", Vec::new()))?;
            TypedValue::Number(number)
        }
        FieldKind::Date => {
            let date = NaiveDate::parse_from_str(raw_value.trim(), DATE_FORMAT)
                .map_err(|_| invalid("expected a date formatted as YYYY-MM-DD", Vec::new()))?;
            TypedValue::Date(date)
        }
        FieldKind::SingleSelect => {
            let option = field
                .find_option(raw_value)
                .ok_or_else(|| invalid("no option with that name", field.option_names()))?;
            TypedValue::SingleSelect(option.id().clone())
        }
        FieldKind::Iteration => {
            return Err(ResolutionError::UnsupportedField {
                field_name: field.name().to_owned(),
                kind: field.kind(),
            });
        }
    };

    Ok(ResolvedFieldValue {
        field_id: field.id().clone(),
        field_name: field.name().to_owned(),
        value,
    })
}
