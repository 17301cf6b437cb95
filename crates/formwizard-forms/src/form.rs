//! Form model: steps, fieldsets, processors, and form metadata.

use std::collections::HashMap;

use serde::Deserialize;

use crate::conditions::Condition;
use crate::field::Field;
use crate::value::ValueMap;

/// HTTP methods a form can submit with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMethod {
    /// GET method
    Get,
    /// POST method
    #[default]
    Post,
}

impl FormMethod {
    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for FormMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the pipeline does with a recoverable processor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionAction {
    /// Propagate the failure to the caller as a fatal error.
    #[default]
    Rethrow,
    /// Treat as a validation failure: annotate the configured fields, stay.
    Fail,
    /// Swallow the failure and continue as if the processor succeeded.
    Ignore,
    /// Surface a form-level message and stay.
    Message,
}

/// A reference from a fieldset to a declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReference {
    /// Name of the referenced field.
    pub field_name: String,
    /// Render with label and error decoration.
    pub wrapped: bool,
    /// Render the read-only variant.
    pub read_only: bool,
}

impl FieldReference {
    /// Creates a wrapped, editable reference.
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            wrapped: true,
            read_only: false,
        }
    }

    /// Renders the field without label/error decoration.
    #[must_use]
    pub fn unwrapped(mut self) -> Self {
        self.wrapped = false;
        self
    }

    /// Renders the read-only variant.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// An ordered group of field references with an optional heading.
#[derive(Debug, Clone, Default)]
pub struct Fieldset {
    /// Optional heading text.
    pub heading: Option<String>,
    /// References in declaration order.
    pub references: Vec<FieldReference>,
}

impl Fieldset {
    /// Creates an empty fieldset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the heading text.
    #[must_use]
    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// Adds a field reference.
    #[must_use]
    pub fn reference(mut self, reference: FieldReference) -> Self {
        self.references.push(reference);
        self
    }

    /// Adds a wrapped, editable reference by field name.
    #[must_use]
    pub fn field(self, field_name: impl Into<String>) -> Self {
        self.reference(FieldReference::new(field_name))
    }
}

/// Declarative description of one processor invocation.
///
/// The name resolves against the engine's processor registry at run time.
/// Arguments arrive already token-substituted by the configuration layer and
/// are passed through verbatim.
pub struct ProcessorSpec {
    /// Registry name of the processor.
    pub name: String,
    /// Fixed argument map handed to the processor.
    pub arguments: serde_json::Map<String, serde_json::Value>,
    /// Fields annotated with the failure message under the `Fail` action.
    pub error_fields: Vec<String>,
    /// Policy for recoverable failures.
    pub exception_action: ExceptionAction,
    condition: Option<Box<dyn Condition>>,
}

impl std::fmt::Debug for ProcessorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorSpec")
            .field("name", &self.name)
            .field("error_fields", &self.error_fields)
            .field("exception_action", &self.exception_action)
            .field("conditional", &self.condition.is_some())
            .finish_non_exhaustive()
    }
}

impl ProcessorSpec {
    /// Creates a spec with defaults: no arguments, no error fields, rethrow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: serde_json::Map::new(),
            error_fields: Vec::new(),
            exception_action: ExceptionAction::default(),
            condition: None,
        }
    }

    /// Sets the argument map.
    #[must_use]
    pub fn arguments(mut self, arguments: serde_json::Map<String, serde_json::Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Sets the fields annotated on failure.
    #[must_use]
    pub fn error_fields(mut self, fields: Vec<String>) -> Self {
        self.error_fields = fields;
        self
    }

    /// Sets the exception-handling policy.
    #[must_use]
    pub fn exception_action(mut self, action: ExceptionAction) -> Self {
        self.exception_action = action;
        self
    }

    /// Attaches an activation condition.
    #[must_use]
    pub fn when(mut self, condition: impl Condition + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Attaches an optional boxed activation condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Option<Box<dyn Condition>>) -> Self {
        self.condition = condition;
        self
    }

    /// Returns whether the processor is active for the given values.
    pub fn applies(&self, values: &ValueMap) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.matches(values))
    }
}

/// One page of a multi-step form.
#[derive(Debug, Default)]
pub struct Step {
    /// Fieldsets in declaration order.
    pub fieldsets: Vec<Fieldset>,
    /// Processors run, in order, after the step validates.
    pub processors: Vec<ProcessorSpec>,
    /// Once passed, earlier steps become unavailable.
    pub one_way: bool,
}

impl Step {
    /// Creates an empty step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fieldset.
    #[must_use]
    pub fn fieldset(mut self, fieldset: Fieldset) -> Self {
        self.fieldsets.push(fieldset);
        self
    }

    /// Adds a processor.
    #[must_use]
    pub fn processor(mut self, processor: ProcessorSpec) -> Self {
        self.processors.push(processor);
        self
    }

    /// Marks the step one-way.
    #[must_use]
    pub fn one_way(mut self) -> Self {
        self.one_way = true;
        self
    }

    /// Returns the names of the fields this step references, in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fieldsets
            .iter()
            .flat_map(|fieldset| fieldset.references.iter())
            .map(|reference| reference.field_name.as_str())
            .collect()
    }
}

/// A complete multi-step form model.
///
/// Built once per form key and shared across sessions; per-session progress
/// and values live in the registry's session slices, never here.
#[derive(Debug)]
pub struct Form {
    steps: Vec<Step>,
    fields: HashMap<String, Field>,
    method: FormMethod,
    submit_url: String,
    target_url: Option<String>,
    submit_button: HashMap<String, String>,
    back_button: HashMap<String, String>,
    reset_button: Option<HashMap<String, String>>,
}

impl Form {
    /// Creates a form posting to the given URL.
    pub fn new(submit_url: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            fields: HashMap::new(),
            method: FormMethod::default(),
            submit_url: submit_url.into(),
            target_url: None,
            submit_button: HashMap::new(),
            back_button: HashMap::new(),
            reset_button: None,
        }
    }

    /// Sets the submit method.
    #[must_use]
    pub fn method(mut self, method: FormMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the redirect destination after the final step.
    #[must_use]
    pub fn target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// Sets the submit button attributes.
    #[must_use]
    pub fn submit_button(mut self, attributes: HashMap<String, String>) -> Self {
        self.submit_button = attributes;
        self
    }

    /// Sets the back button attributes.
    #[must_use]
    pub fn back_button(mut self, attributes: HashMap<String, String>) -> Self {
        self.back_button = attributes;
        self
    }

    /// Enables a reset button with the given attributes.
    #[must_use]
    pub fn reset_button(mut self, attributes: HashMap<String, String>) -> Self {
        self.reset_button = Some(attributes);
        self
    }

    /// Declares a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name().to_string(), field);
        self
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns the steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the step at the given index.
    pub fn step_at(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Returns the number of steps.
    pub fn steps_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether the form has more than one step.
    pub fn is_multi_step(&self) -> bool {
        self.steps.len() > 1
    }

    /// Looks up a declared field by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Returns the fields referenced by the step at the given index.
    ///
    /// References are resolved at build time, so every name is present.
    pub fn step_fields(&self, index: usize) -> Vec<&Field> {
        self.step_at(index)
            .map(|step| {
                step.field_names()
                    .iter()
                    .filter_map(|name| self.fields.get(*name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the submit method.
    pub fn form_method(&self) -> FormMethod {
        self.method
    }

    /// Returns the submit URL.
    pub fn submit_url(&self) -> &str {
        &self.submit_url
    }

    /// Returns the post-completion redirect target, if any.
    pub fn get_target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    /// Returns the submit button attributes.
    pub fn submit_button_attributes(&self) -> &HashMap<String, String> {
        &self.submit_button
    }

    /// Returns the back button attributes.
    pub fn back_button_attributes(&self) -> &HashMap<String, String> {
        &self.back_button
    }

    /// Returns the reset button attributes when a reset button is configured.
    pub fn reset_button_attributes(&self) -> Option<&HashMap<String, String>> {
        self.reset_button.as_ref()
    }
}
