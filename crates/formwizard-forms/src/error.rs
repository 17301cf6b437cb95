//! Error types for form building and validation.

use std::collections::HashMap;
use thiserror::Error;

/// Pseudo-field under which form-level (non-field) messages are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Errors raised while building a form from its definition.
///
/// These are configuration errors: they are detected at build time, surfaced
/// to the operator, and never stored in session state.
#[derive(Debug, Error)]
pub enum FormError {
    /// A field definition names a kind the builder does not know.
    #[error("unknown field kind `{kind}` for field `{field}`")]
    UnknownFieldKind { field: String, kind: String },

    /// A constraint definition names a kind missing from the registry.
    #[error("unknown constraint kind `{kind}` for field `{field}`")]
    UnknownConstraintKind { field: String, kind: String },

    /// A condition definition names a kind missing from the registry.
    #[error("unknown condition kind `{0}`")]
    UnknownConditionKind(String),

    /// A fieldset references a field that is not declared.
    #[error("step {step} references undeclared field `{field}`")]
    UnresolvedFieldReference { step: usize, field: String },

    /// A required definition key is missing or has the wrong shape.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// The definition source could not be parsed.
    #[error("failed to parse form definition: {0}")]
    ParseError(#[from] serde_json::Error),

    /// No definition file was found on the search path.
    #[error("no definition found for form `{0}`")]
    DefinitionNotFound(String),

    /// The definition source could not be read.
    #[error("failed to read form definition: {0}")]
    IoError(#[from] std::io::Error),
}

/// Collection of validation errors by field.
///
/// An empty collection means the validated value set was valid; callers must
/// treat empty as "valid", never as missing data.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationErrors {
    /// Errors keyed by field name.
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self {
            errors: HashMap::new(),
        }
    }

    /// Adds an error for a field, preserving insertion order per field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Adds a form-level error not attached to any field.
    pub fn add_global(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns all errors as a flat list.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form building operations.
pub type Result<T> = std::result::Result<T, FormError>;
