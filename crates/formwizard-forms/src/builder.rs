//! Builds form models from declarative definitions.
//!
//! Constraint and condition kinds resolve through explicit name-to-factory
//! registries populated at startup; field kinds are closed over
//! [`FieldKind`]. Unknown names fail the build.

use std::collections::HashMap;

use serde_json::Value;

use crate::conditions::{Condition, PresentCondition, ValueMatchCondition};
use crate::definition::{
    ConditionDefinition, ConstraintDefinition, FieldDefinition, FieldReferenceDefinition,
    FormDefinition,
};
use crate::error::{FormError, Result};
use crate::field::{ConditionalConstraint, Field, FieldKind, FieldOption};
use crate::form::{FieldReference, Fieldset, Form, FormMethod, ProcessorSpec, Step};
use crate::validation::{
    Constraint, EmailConstraint, MaxLengthConstraint, MinLengthConstraint, RangeConstraint,
    RegexConstraint, RequiredConstraint, UrlConstraint,
};

/// Factory producing a constraint from its definition.
pub type ConstraintFactory =
    Box<dyn Fn(&ConstraintDefinition) -> Result<Box<dyn Constraint>> + Send + Sync>;

/// Factory producing a condition from its definition.
pub type ConditionFactory =
    Box<dyn Fn(&ConditionDefinition) -> Result<Box<dyn Condition>> + Send + Sync>;

/// Name-to-factory registry for constraint kinds.
pub struct ConstraintRegistry {
    factories: HashMap<String, ConstraintFactory>,
}

impl ConstraintRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in constraint kinds.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("required", |def| {
            Ok(Box::new(match &def.message {
                Some(message) => RequiredConstraint::with_message(message),
                None => RequiredConstraint::new(),
            }))
        });
        registry.register("min-length", |def| {
            let length = require_usize(def, "length")?;
            Ok(Box::new(match &def.message {
                Some(message) => MinLengthConstraint::with_message(length, message),
                None => MinLengthConstraint::new(length),
            }))
        });
        registry.register("max-length", |def| {
            let length = require_usize(def, "length")?;
            Ok(Box::new(match &def.message {
                Some(message) => MaxLengthConstraint::with_message(length, message),
                None => MaxLengthConstraint::new(length),
            }))
        });
        registry.register("email", |def| {
            Ok(Box::new(match &def.message {
                Some(message) => EmailConstraint::with_message(message),
                None => EmailConstraint::new(),
            }))
        });
        registry.register("url", |def| {
            Ok(Box::new(match &def.message {
                Some(message) => UrlConstraint::with_message(message),
                None => UrlConstraint::new(),
            }))
        });
        registry.register("regex", |def| {
            let pattern = require_str(&def.options, "pattern", "regex constraint")?;
            let message = def
                .message
                .clone()
                .unwrap_or_else(|| "Enter a valid value.".to_string());
            let constraint = RegexConstraint::new(&pattern, message)
                .map_err(|e| FormError::InvalidDefinition(format!("invalid pattern: {e}")))?;
            Ok(Box::new(constraint))
        });
        registry.register("range", |def| {
            let min = def.options.get("min").and_then(Value::as_f64);
            let max = def.options.get("max").and_then(Value::as_f64);
            Ok(Box::new(match &def.message {
                Some(message) => RangeConstraint::with_message(min, max, message),
                None => RangeConstraint::new(min, max),
            }))
        });
        registry
    }

    /// Registers a factory under the given kind name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ConstraintDefinition) -> Result<Box<dyn Constraint>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Builds a constraint, failing on unknown kinds.
    pub fn build(&self, field: &str, definition: &ConstraintDefinition) -> Result<Box<dyn Constraint>> {
        let factory =
            self.factories
                .get(&definition.name)
                .ok_or_else(|| FormError::UnknownConstraintKind {
                    field: field.to_string(),
                    kind: definition.name.clone(),
                })?;
        factory(definition)
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Name-to-factory registry for condition kinds.
pub struct ConditionRegistry {
    factories: HashMap<String, ConditionFactory>,
}

impl ConditionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in condition kinds.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("match", |def| {
            let field = require_str(&def.options, "field", "match condition")?;
            let accepted = def
                .options
                .get("values")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .ok_or_else(|| {
                    FormError::InvalidDefinition(
                        "match condition requires a `values` array".to_string(),
                    )
                })?;
            Ok(Box::new(ValueMatchCondition::new(field, accepted)))
        });
        registry.register("present", |def| {
            let field = require_str(&def.options, "field", "present condition")?;
            Ok(Box::new(PresentCondition::new(field)))
        });
        registry
    }

    /// Registers a factory under the given kind name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ConditionDefinition) -> Result<Box<dyn Condition>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Builds a condition, failing on unknown kinds.
    pub fn build(&self, definition: &ConditionDefinition) -> Result<Box<dyn Condition>> {
        let factory = self
            .factories
            .get(&definition.name)
            .ok_or_else(|| FormError::UnknownConditionKind(definition.name.clone()))?;
        factory(definition)
    }

    fn build_optional(
        &self,
        definition: Option<&ConditionDefinition>,
    ) -> Result<Option<Box<dyn Condition>>> {
        definition.map(|def| self.build(def)).transpose()
    }
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn require_str(
    options: &serde_json::Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<String> {
    options
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            FormError::InvalidDefinition(format!("{context} requires a string `{key}`"))
        })
}

fn require_usize(definition: &ConstraintDefinition, key: &str) -> Result<usize> {
    definition
        .options
        .get(key)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| {
            FormError::InvalidDefinition(format!(
                "`{}` constraint requires an integer `{key}`",
                definition.name
            ))
        })
}

/// Builds [`Form`] models from [`FormDefinition`]s.
///
/// Building is a pure transform: the same definition always yields a
/// structurally equal form, and nothing outside the returned model is
/// touched.
pub struct FormBuilder {
    constraints: ConstraintRegistry,
    conditions: ConditionRegistry,
}

impl FormBuilder {
    /// Creates a builder with the built-in constraint and condition kinds.
    pub fn new() -> Self {
        Self {
            constraints: ConstraintRegistry::with_defaults(),
            conditions: ConditionRegistry::with_defaults(),
        }
    }

    /// Creates a builder over custom registries.
    pub fn with_registries(constraints: ConstraintRegistry, conditions: ConditionRegistry) -> Self {
        Self {
            constraints,
            conditions,
        }
    }

    /// Builds a form model from a definition.
    pub fn build(&self, definition: &FormDefinition) -> Result<Form> {
        let submit_url = definition.form.submit_url.as_deref().ok_or_else(|| {
            FormError::InvalidDefinition("form.submit-url is required".to_string())
        })?;

        let method = match definition.form.method.as_deref() {
            Some(method) => FormMethod::parse(method).ok_or_else(|| {
                FormError::InvalidDefinition(format!("unsupported form method `{method}`"))
            })?,
            None => FormMethod::default(),
        };

        let mut form = Form::new(submit_url)
            .method(method)
            .submit_button(definition.form.submit_button.clone())
            .back_button(definition.form.back_button.clone());
        if let Some(target_url) = &definition.form.target_url {
            form = form.target_url(target_url);
        }
        if let Some(reset) = &definition.form.reset_button {
            form = form.reset_button(reset.clone());
        }

        for (name, field_definition) in &definition.fields {
            form = form.field(self.build_field(name, field_definition)?);
        }

        for (index, step_definition) in definition.steps.iter().enumerate() {
            let mut step = Step::new();
            if step_definition.one_way {
                step = step.one_way();
            }

            for fieldset_definition in &step_definition.fieldsets {
                let mut fieldset = Fieldset::new();
                if let Some(heading) = &fieldset_definition.heading {
                    fieldset = fieldset.heading(heading);
                }
                for reference_definition in &fieldset_definition.fields {
                    let name = reference_definition.field_name();
                    if !definition.fields.contains_key(name) {
                        return Err(FormError::UnresolvedFieldReference {
                            step: index,
                            field: name.to_string(),
                        });
                    }
                    fieldset = fieldset.reference(build_reference(reference_definition));
                }
                step = step.fieldset(fieldset);
            }

            for processor_definition in &step_definition.processors {
                let condition = self
                    .conditions
                    .build_optional(processor_definition.condition.as_ref())?;
                step = step.processor(
                    ProcessorSpec::new(&processor_definition.name)
                        .arguments(processor_definition.arguments.clone())
                        .error_fields(processor_definition.exception_field_names.clone())
                        .exception_action(processor_definition.exception_action)
                        .with_condition(condition),
                );
            }

            form = form.step(step);
        }

        Ok(form)
    }

    fn build_field(&self, name: &str, definition: &FieldDefinition) -> Result<Field> {
        let kind = match definition.kind.as_str() {
            "input" => FieldKind::Input {
                input_type: definition
                    .input_type
                    .clone()
                    .unwrap_or_else(|| "text".to_string()),
            },
            "textarea" => FieldKind::Textarea {
                rows: definition.rows.unwrap_or(4),
                cols: definition.cols.unwrap_or(40),
            },
            "select" => FieldKind::Select {
                options: build_options(definition),
            },
            "multi-input" => FieldKind::MultiInput {
                options: build_options(definition),
            },
            "captcha" => FieldKind::Captcha {
                question: definition.question.clone().ok_or_else(|| {
                    FormError::InvalidDefinition(format!(
                        "captcha field `{name}` requires a `question`"
                    ))
                })?,
            },
            other => {
                return Err(FormError::UnknownFieldKind {
                    field: name.to_string(),
                    kind: other.to_string(),
                })
            }
        };

        let mut field = Field::new(name, kind);
        if let Some(default) = &definition.default {
            field = field.default_value(default.clone());
        }
        if definition.array_value {
            field = field.array_value();
        }

        for constraint_definition in &definition.constraints {
            let constraint = self.constraints.build(name, constraint_definition)?;
            let condition = self
                .conditions
                .build_optional(constraint_definition.condition.as_ref())?;
            field =
                field.conditional_constraint(ConditionalConstraint::from_parts(constraint, condition));
        }

        Ok(field)
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_options(definition: &FieldDefinition) -> Vec<FieldOption> {
    definition
        .values
        .iter()
        .map(|option| {
            FieldOption::new(
                &option.value,
                option.label.clone().unwrap_or_else(|| option.value.clone()),
            )
        })
        .collect()
}

fn build_reference(definition: &FieldReferenceDefinition) -> FieldReference {
    match definition {
        FieldReferenceDefinition::Name(name) => FieldReference::new(name),
        FieldReferenceDefinition::Full {
            field,
            wrapped,
            read_only,
        } => {
            let mut reference = FieldReference::new(field);
            if !wrapped {
                reference = reference.unwrapped();
            }
            if *read_only {
                reference = reference.read_only();
            }
            reference
        }
    }
}
