//! Declarative form definitions parsed from JSON.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{FormError, Result};
use crate::form::ExceptionAction;
use crate::value::FieldValue;

/// Top-level form definition as found in a definition file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FormDefinition {
    /// Form metadata: URLs, method, buttons.
    #[serde(default)]
    pub form: FormMetadataDefinition,
    /// Declared fields, keyed by name.
    #[serde(default)]
    pub fields: HashMap<String, FieldDefinition>,
    /// Steps in page order.
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// Form metadata section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FormMetadataDefinition {
    /// URL the form posts to.
    pub submit_url: Option<String>,
    /// Redirect destination after the final step.
    pub target_url: Option<String>,
    /// Submit method, "get" or "post".
    pub method: Option<String>,
    /// Submit button attributes.
    #[serde(default)]
    pub submit_button: HashMap<String, String>,
    /// Back button attributes.
    #[serde(default)]
    pub back_button: HashMap<String, String>,
    /// Reset button attributes; present means the button is rendered.
    pub reset_button: Option<HashMap<String, String>>,
}

/// One field declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDefinition {
    /// Field kind: input, textarea, select, multi-input, captcha.
    #[serde(rename = "type", default = "default_field_kind")]
    pub kind: String,
    /// HTML input type for input fields.
    pub input_type: Option<String>,
    /// Row count for textarea fields.
    pub rows: Option<usize>,
    /// Column count for textarea fields.
    pub cols: Option<usize>,
    /// Options for select and multi-input fields.
    #[serde(default)]
    pub values: Vec<OptionDefinition>,
    /// Challenge question for captcha fields.
    pub question: Option<String>,
    /// Default value.
    pub default: Option<FieldValue>,
    /// Whether the field carries a list value.
    #[serde(default)]
    pub array_value: bool,
    /// Constraints in declaration order.
    #[serde(default)]
    pub constraints: Vec<ConstraintDefinition>,
}

fn default_field_kind() -> String {
    "input".to_string()
}

/// One selectable option.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionDefinition {
    /// Submitted value.
    pub value: String,
    /// Display label; defaults to the value.
    pub label: Option<String>,
}

/// One constraint declaration.
///
/// Keys other than `name`, `message`, and `condition` are collected into
/// `options` and interpreted by the constraint factory.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintDefinition {
    /// Registry name of the constraint.
    pub name: String,
    /// Override for the constraint's message.
    pub message: Option<String>,
    /// Activation condition.
    pub condition: Option<ConditionDefinition>,
    /// Remaining factory-specific options.
    #[serde(flatten)]
    pub options: serde_json::Map<String, Value>,
}

/// One condition declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDefinition {
    /// Registry name of the condition.
    pub name: String,
    /// Remaining factory-specific options.
    #[serde(flatten)]
    pub options: serde_json::Map<String, Value>,
}

/// One step declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StepDefinition {
    /// Whether passing this step locks earlier steps.
    #[serde(default)]
    pub one_way: bool,
    /// Fieldsets in declaration order.
    #[serde(default)]
    pub fieldsets: Vec<FieldsetDefinition>,
    /// Processors in execution order.
    #[serde(default)]
    pub processors: Vec<ProcessorDefinition>,
}

/// One fieldset declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldsetDefinition {
    /// Optional heading text.
    pub heading: Option<String>,
    /// Field references in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldReferenceDefinition>,
}

/// A field reference: either a bare name or a table with flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldReferenceDefinition {
    /// Bare field name: wrapped, editable.
    Name(String),
    /// Full reference with flags.
    Full {
        /// Name of the referenced field.
        field: String,
        /// Render with label and error decoration.
        #[serde(default = "default_true")]
        wrapped: bool,
        /// Render the read-only variant.
        #[serde(default, rename = "read-only")]
        read_only: bool,
    },
}

fn default_true() -> bool {
    true
}

impl FieldReferenceDefinition {
    /// Returns the referenced field name.
    pub fn field_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Full { field, .. } => field,
        }
    }
}

/// One processor declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessorDefinition {
    /// Registry name of the processor.
    pub name: String,
    /// Fixed argument map.
    #[serde(default)]
    pub arguments: serde_json::Map<String, Value>,
    /// Fields annotated with the failure message under the `fail` action.
    #[serde(default)]
    pub exception_field_names: Vec<String>,
    /// Policy for recoverable failures.
    #[serde(default)]
    pub exception_action: ExceptionAction,
    /// Activation condition.
    pub condition: Option<ConditionDefinition>,
}

impl FormDefinition {
    /// Parses a definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a definition from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Loads `<dir>/<form_key>.json` from the first search path that has it.
    ///
    /// Paths are tried in order, so a site override directory listed before
    /// the module default directory wins.
    pub fn load(form_key: &str, search_paths: &[&Path]) -> Result<Self> {
        let value = Self::load_value(form_key, search_paths)?;
        Self::from_value(value)
    }

    /// Loads a definition and merges it over a base-configuration overlay.
    ///
    /// The loaded document wins on key collisions; the base fills the gaps.
    pub fn load_with_base(form_key: &str, search_paths: &[&Path], base: &Value) -> Result<Self> {
        let value = Self::load_value(form_key, search_paths)?;
        Self::from_value(merge_definition_values(base, &value))
    }

    fn load_value(form_key: &str, search_paths: &[&Path]) -> Result<Value> {
        for dir in search_paths {
            let path = dir.join(format!("{form_key}.json"));
            if path.is_file() {
                let text = std::fs::read_to_string(&path)?;
                return Ok(serde_json::from_str(&text)?);
            }
        }
        Err(FormError::DefinitionNotFound(form_key.to_string()))
    }
}

/// Recursively merges two definition values, overlay winning per key.
///
/// Objects merge key-wise; any other pairing takes the overlay wholesale.
pub fn merge_definition_values(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let entry = match merged.get(key) {
                    Some(base_value) => merge_definition_values(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}
