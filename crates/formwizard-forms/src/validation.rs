//! Field constraints and the step validation engine.

use regex::Regex;

use crate::error::ValidationErrors;
use crate::field::Field;
use crate::value::{FieldValue, ValueMap};

/// Trait for field constraints.
pub trait Constraint: Send + Sync {
    /// Validates a value and returns an error message if invalid.
    fn validate(&self, value: &FieldValue) -> Result<(), String>;

    /// Returns the error message for this constraint.
    fn message(&self) -> &str;
}

/// Constraint that requires a non-empty value.
#[derive(Debug, Clone)]
pub struct RequiredConstraint {
    message: String,
}

impl RequiredConstraint {
    /// Creates a new RequiredConstraint with default message.
    pub fn new() -> Self {
        Self {
            message: "This field is required.".to_string(),
        }
    }

    /// Creates a new RequiredConstraint with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl Constraint for RequiredConstraint {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.is_empty() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Constraint that enforces a maximum length on every item.
#[derive(Debug, Clone)]
pub struct MaxLengthConstraint {
    max_length: usize,
    message: String,
}

impl MaxLengthConstraint {
    /// Creates a new MaxLengthConstraint.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Ensure this value has at most {max_length} characters."),
        }
    }

    /// Creates a new MaxLengthConstraint with custom message.
    pub fn with_message(max_length: usize, message: impl Into<String>) -> Self {
        Self {
            max_length,
            message: message.into(),
        }
    }
}

impl Constraint for MaxLengthConstraint {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.items().iter().any(|item| item.len() > self.max_length) {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Constraint that enforces a minimum length on every non-empty item.
#[derive(Debug, Clone)]
pub struct MinLengthConstraint {
    min_length: usize,
    message: String,
}

impl MinLengthConstraint {
    /// Creates a new MinLengthConstraint.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            message: format!("Ensure this value has at least {min_length} characters."),
        }
    }

    /// Creates a new MinLengthConstraint with custom message.
    pub fn with_message(min_length: usize, message: impl Into<String>) -> Self {
        Self {
            min_length,
            message: message.into(),
        }
    }
}

impl Constraint for MinLengthConstraint {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        // Emptiness is RequiredConstraint's concern.
        if value.is_empty() {
            return Ok(());
        }
        if value.items().iter().any(|item| item.len() < self.min_length) {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Constraint for email addresses.
#[derive(Debug, Clone)]
pub struct EmailConstraint {
    message: String,
}

impl EmailConstraint {
    /// Creates a new EmailConstraint with default message.
    pub fn new() -> Self {
        Self {
            message: "Enter a valid email address.".to_string(),
        }
    }

    /// Creates a new EmailConstraint with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for EmailConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl Constraint for EmailConstraint {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }
        // Basic email validation regex
        let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

        if value.items().iter().all(|item| email_regex.is_match(item)) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Constraint for URL values.
#[derive(Debug, Clone)]
pub struct UrlConstraint {
    message: String,
}

impl UrlConstraint {
    /// Creates a new UrlConstraint with default message.
    pub fn new() -> Self {
        Self {
            message: "Enter a valid URL.".to_string(),
        }
    }

    /// Creates a new UrlConstraint with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for UrlConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl Constraint for UrlConstraint {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }
        let valid = value
            .items()
            .iter()
            .all(|item| item.starts_with("http://") || item.starts_with("https://"));
        if valid {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Constraint using a custom regex pattern.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    pattern: Regex,
    message: String,
}

impl RegexConstraint {
    /// Creates a new RegexConstraint.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }
}

impl Constraint for RegexConstraint {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }
        if value.items().iter().all(|item| self.pattern.is_match(item)) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Constraint for numeric range.
#[derive(Debug, Clone)]
pub struct RangeConstraint {
    min: Option<f64>,
    max: Option<f64>,
    message: String,
}

impl RangeConstraint {
    /// Creates a new RangeConstraint with min and max bounds.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let message = match (min, max) {
            (Some(min), Some(max)) => format!("Value must be between {min} and {max}."),
            (Some(min), None) => format!("Value must be at least {min}."),
            (None, Some(max)) => format!("Value must be at most {max}."),
            (None, None) => "Invalid value.".to_string(),
        };
        Self { min, max, message }
    }

    /// Creates a new RangeConstraint with custom message.
    pub fn with_message(min: Option<f64>, max: Option<f64>, message: impl Into<String>) -> Self {
        Self {
            min,
            max,
            message: message.into(),
        }
    }
}

impl Constraint for RangeConstraint {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }
        for item in value.items() {
            let num: f64 = item
                .parse()
                .map_err(|_| "Enter a valid number.".to_string())?;

            if let Some(min) = self.min {
                if num < min {
                    return Err(self.message.clone());
                }
            }

            if let Some(max) = self.max {
                if num > max {
                    return Err(self.message.clone());
                }
            }
        }

        Ok(())
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validates a set of fields against the current values.
///
/// For each field, constraints whose condition holds (or is absent) run
/// against the field's value in declaration order; a missing value validates
/// as empty. Field order carries no dependency; the per-field message lists
/// preserve constraint order. The value map is never mutated, and an empty
/// result means the whole set is valid.
pub fn validate(fields: &[&Field], values: &ValueMap) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for field in fields {
        let empty = FieldValue::empty();
        let value = values.get(field.name()).unwrap_or(&empty);

        for conditional in field.conditional_constraints() {
            if !conditional.applies(values) {
                continue;
            }
            if let Err(message) = conditional.constraint().validate(value) {
                errors.add(field.name(), message);
            }
        }
    }

    errors
}
