//! # formwizard-forms
//!
//! Multi-step form models with declarative building and validation.
//!
//! This crate provides:
//! - Field, step, and form models for multi-page forms
//! - Constraints with optional activation conditions
//! - A validation engine producing per-field error maps
//! - A builder turning JSON definitions into form models
//!
//! ## Quick Start
//!
//! ```rust
//! use formwizard_forms::{
//!     Field, FieldKind, Fieldset, Form, Step,
//!     RequiredConstraint, validate, ValueMap, FieldValue,
//! };
//!
//! // Define a two-step form
//! let form = Form::new("/contact")
//!     .target_url("/thanks")
//!     .field(
//!         Field::new("email", FieldKind::input("email"))
//!             .constraint(RequiredConstraint::new()),
//!     )
//!     .field(Field::new("message", FieldKind::Textarea { rows: 4, cols: 40 }))
//!     .step(Step::new().fieldset(Fieldset::new().field("email")))
//!     .step(Step::new().fieldset(Fieldset::new().field("message")));
//!
//! // Validate the first step
//! let mut values = ValueMap::new();
//! values.insert("email".to_string(), FieldValue::from("a@b.com"));
//! let errors = validate(&form.step_fields(0), &values);
//! assert!(errors.is_empty());
//! ```
//!
//! ## Declarative Definitions
//!
//! ```rust
//! use formwizard_forms::{FormBuilder, FormDefinition};
//!
//! let definition = FormDefinition::from_json(r#"{
//!     "form": { "submit-url": "/contact" },
//!     "fields": {
//!         "email": {
//!             "input-type": "email",
//!             "constraints": [ { "name": "required" }, { "name": "email" } ]
//!         }
//!     },
//!     "steps": [ { "fieldsets": [ { "fields": ["email"] } ] } ]
//! }"#).unwrap();
//!
//! let form = FormBuilder::new().build(&definition).unwrap();
//! assert_eq!(form.steps_count(), 1);
//! ```
//!
//! Constraint and condition kinds resolve through explicit registries; custom
//! kinds are added with [`ConstraintRegistry::register`] and
//! [`ConditionRegistry::register`].

pub mod builder;
pub mod conditions;
pub mod definition;
mod error;
mod field;
mod form;
pub mod validation;
mod value;

pub use builder::{ConditionRegistry, ConstraintRegistry, FormBuilder};
pub use conditions::{Condition, PresentCondition, ValueMatchCondition};
pub use definition::{FormDefinition, merge_definition_values};
pub use error::{FormError, Result, ValidationErrors, NON_FIELD_ERRORS};
pub use field::{ConditionalConstraint, Field, FieldKind, FieldOption};
pub use form::{
    ExceptionAction, FieldReference, Fieldset, Form, FormMethod, ProcessorSpec, Step,
};
pub use validation::{
    validate, Constraint, EmailConstraint, MaxLengthConstraint, MinLengthConstraint,
    RangeConstraint, RegexConstraint, RequiredConstraint, UrlConstraint,
};
pub use value::{FieldValue, ValueMap};
