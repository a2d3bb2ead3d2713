use std::collections::BTreeSet;
use std::fmt;

use crate::error::{FinmanError, Result};
use crate::models::{TxnId, COL_VALUE};

pub const FIELD_ID: &str = "_id";
pub const FIELD_IDX: &str = "_idx";
pub const FIELD_MODIFIED: &str = "_is_modified";
pub const FIELD_CAT_ALT: &str = "_cat_alt";
pub const FIELD_SOURCE_LINE: &str = "source_line";

/// Fields every transaction has, besides its columns and annotations.
pub const PSEUDO_FIELDS: [&str; 5] = [
    FIELD_ID,
    FIELD_IDX,
    FIELD_MODIFIED,
    FIELD_CAT_ALT,
    FIELD_SOURCE_LINE,
];

/// Fields compared as numbers, on which substring tests make no sense.
pub fn is_numeric(field: &str) -> bool {
    matches!(field, FIELD_ID | FIELD_IDX | FIELD_SOURCE_LINE | COL_VALUE)
}

/// Column heading for a field.
pub fn heading(field: &str) -> &str {
    match field {
        FIELD_IDX => "#",
        FIELD_MODIFIED => "mod",
        FIELD_CAT_ALT => "cat new",
        other => other,
    }
}

/// Expand an abbreviated field name.
///
/// An exact name wins; otherwise the prefix must match exactly one known field.
pub fn resolve(partial: &str, known: &BTreeSet<String>) -> Result<String> {
    if known.contains(partial) {
        return Ok(partial.to_string());
    }
    let candidates: Vec<&String> = known.iter().filter(|f| f.starts_with(partial)).collect();
    match candidates.as_slice() {
        [] => Err(FinmanError::UnknownField(partial.to_string())),
        [single] => {
            tracing::debug!(field = partial, expanded = %single, "field name expanded");
            Ok((*single).clone())
        }
        many => Err(FinmanError::AmbiguousField {
            field: partial.to_string(),
            candidates: many.iter().map(|f| f.to_string()).collect(),
        }),
    }
}

/// Anything that can be asked for a field by resolved name.
pub trait FieldSource {
    /// Unknown fields read as empty text.
    fn field(&self, name: &str) -> FieldValue;
}

/// Value of a field as seen by filters and renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Id(TxnId),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}
