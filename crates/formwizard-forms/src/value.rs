//! Submitted and stored field values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The value of a single field.
///
/// Plain inputs carry a single string; multi-input fields (checkbox groups,
/// multi-selects) carry a list of strings. Serialized untagged so session
/// state and seed parameters read naturally as JSON strings or arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A single string value.
    Single(String),
    /// An ordered list of selected values.
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Returns an empty single value.
    pub fn empty() -> Self {
        Self::Single(String::new())
    }

    /// Returns the value as a string slice, for single values only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s.as_str()),
            Self::Multiple(_) => None,
        }
    }

    /// Returns the individual string items of this value.
    pub fn items(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Multiple(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Returns whether the value holds no usable content.
    ///
    /// A single value is empty when blank after trimming; a list is empty
    /// when it has no non-blank items.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(s) => s.trim().is_empty(),
            Self::Multiple(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    /// Returns whether any item equals the given string.
    pub fn contains(&self, needle: &str) -> bool {
        self.items().iter().any(|item| *item == needle)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(s) => write!(f, "{s}"),
            Self::Multiple(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Field values keyed by field name.
pub type ValueMap = HashMap<String, FieldValue>;
