//! # formwizard-render
//!
//! HTML rendering for multi-step form models with Bootstrap 5 markup.
//!
//! This crate provides:
//! - Per-kind field renderers with read-only variants
//! - Fieldset and form renderers with label and error decoration
//! - A renderer factory layering caller, registered, and innate options
//!
//! Rendering is a pure function of the form model, the current values, and
//! the current errors; the state machine in `formwizard-engine` is never
//! consulted.
//!
//! ## Quick Start
//!
//! ```rust
//! use formwizard_forms::{
//!     Field, FieldKind, Fieldset, Form, Step, ValidationErrors, ValueMap,
//! };
//! use formwizard_render::RendererFactory;
//!
//! let form = Form::new("/contact")
//!     .field(Field::new("email", FieldKind::input("email")))
//!     .step(Step::new().fieldset(Fieldset::new().field("email")));
//!
//! let factory = RendererFactory::new();
//! let html = factory.render_form(
//!     &form, 0, &ValueMap::new(), &ValidationErrors::new(),
//! );
//! assert!(html.contains(r#"name="email""#));
//! ```

mod factory;
pub mod fields;
mod form;
mod options;

pub use factory::{RendererFactory, READ_ONLY_KIND};
pub use fields::{
    html_escape, CaptchaRenderer, FieldRenderer, InputRenderer, MultiInputRenderer,
    ReadOnlyRenderer, SelectRenderer, TextareaRenderer,
};
pub use form::{humanize_field_name, render_fieldset, render_form, render_wrapped_field};
pub use options::{AttributeMap, RenderOptions};
