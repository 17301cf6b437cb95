//! # formwizard-engine
//!
//! Session-backed state machine and processor pipeline for multi-step forms.
//!
//! This crate provides:
//! - A `SessionStore` interface with an in-memory implementation
//! - The `FormRegistry` tracking per-form progress, values, and errors
//! - A processor pipeline with per-processor failure policies
//! - A `Response` value for processors that short-circuit to the caller
//!
//! ## Quick Start
//!
//! ```rust
//! use formwizard_engine::{FormRegistry, MemorySession, SubmitOutcome};
//! use formwizard_forms::{
//!     Field, FieldKind, FieldValue, Fieldset, Form, RequiredConstraint, Step, ValueMap,
//! };
//!
//! let mut registry = FormRegistry::new();
//! registry.register_form(
//!     "contact",
//!     Form::new("/contact")
//!         .field(
//!             Field::new("email", FieldKind::input("email"))
//!                 .constraint(RequiredConstraint::new()),
//!         )
//!         .step(Step::new().fieldset(Fieldset::new().field("email"))),
//! );
//!
//! let mut session = MemorySession::new();
//! let mut values = ValueMap::new();
//! values.insert("email".to_string(), FieldValue::from("a@b.com"));
//!
//! let outcome = registry
//!     .submit_step(&mut session, "contact", &values, false)
//!     .unwrap();
//! assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
//! ```
//!
//! The registry never touches session storage except through the injected
//! [`SessionStore`], so the whole state machine runs against [`MemorySession`]
//! in tests.

mod error;
pub mod processor;
pub mod registry;
mod response;
mod session;

pub use error::{EngineError, Result};
pub use processor::{
    FormProcessor, PipelineOutcome, ProcessorContext, ProcessorError, ProcessorRegistry,
};
pub use registry::{FileSource, FormRegistry, FormSource, SubmitOutcome};
pub use response::Response;
pub use session::{MemorySession, SessionStore, SessionStoreExt};
