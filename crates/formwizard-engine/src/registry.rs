//! The form registry: per-form session state and step transitions.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use formwizard_forms::{
    validate, Form, FormBuilder, FormDefinition, ValidationErrors, ValueMap,
};

use crate::error::{EngineError, Result};
use crate::processor::{PipelineOutcome, ProcessorRegistry};
use crate::response::Response;
use crate::session::{SessionStore, SessionStoreExt};

/// Session slot holding pending field values.
const SLOT_VALUES: &str = "values";
/// Session slot holding pending field errors.
const SLOT_ERRORS: &str = "errors";
/// Session slot holding the current step index.
const SLOT_CURRENT_STEP: &str = "current-step";
/// Session slot holding the unlocked step set.
const SLOT_AVAILABLE_STEPS: &str = "available-steps";

fn slot_key(form_key: &str, slot: &str) -> String {
    format!("forms.{form_key}.{slot}")
}

/// Supplies form models to the registry, keyed by form key.
pub trait FormSource: Send + Sync {
    /// Loads and builds the form for the given key.
    fn load(&self, form_key: &str) -> formwizard_forms::Result<Form>;
}

/// Loads `<dir>/<key>.json` definitions from an ordered search path.
///
/// A site override directory listed before the module default directory wins;
/// an optional base configuration fills gaps underneath whichever document
/// was found.
pub struct FileSource {
    search_paths: Vec<PathBuf>,
    base: Option<serde_json::Value>,
    builder: FormBuilder,
}

impl FileSource {
    /// Creates a source over the given search paths.
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            base: None,
            builder: FormBuilder::new(),
        }
    }

    /// Sets the base-configuration overlay.
    #[must_use]
    pub fn base(mut self, base: serde_json::Value) -> Self {
        self.base = Some(base);
        self
    }

    /// Replaces the form builder, e.g. one with custom registries.
    #[must_use]
    pub fn builder(mut self, builder: FormBuilder) -> Self {
        self.builder = builder;
        self
    }
}

impl FormSource for FileSource {
    fn load(&self, form_key: &str) -> formwizard_forms::Result<Form> {
        let paths: Vec<&Path> = self.search_paths.iter().map(PathBuf::as_path).collect();
        let definition = match &self.base {
            Some(base) => FormDefinition::load_with_base(form_key, &paths, base)?,
            None => FormDefinition::load(form_key, &paths)?,
        };
        self.builder.build(&definition)
    }
}

/// Outcome of a step submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation or a `Fail`-policy processor rejected the step; errors are
    /// stored and the caller re-renders the current step.
    Invalid(ValidationErrors),
    /// Backward navigation succeeded.
    Rewound {
        /// The new current step.
        step: usize,
    },
    /// The step passed and the pointer moved forward.
    Advanced {
        /// The new current step.
        step: usize,
    },
    /// The final step passed; all state has been cleared.
    Completed {
        /// The form's configured redirect destination, if any.
        target_url: Option<String>,
    },
    /// A processor short-circuited with a response; the step did not advance.
    Response(Response),
    /// A `Message`-policy processor failed; re-render the current step with
    /// this form-level message.
    Message(String),
}

/// Tracks per-session progress through multi-step forms.
///
/// Form models are built lazily per key and cached for the registry's
/// lifetime; all per-user state lives in the injected session store under
/// `forms.<formKey>.<slot>` keys. After every successful transition the
/// current step is a member of the available set and inside the form's step
/// range.
pub struct FormRegistry {
    source: Option<Box<dyn FormSource>>,
    forms: HashMap<String, Arc<Form>>,
    processors: ProcessorRegistry,
}

impl FormRegistry {
    /// Creates a registry with no definition source.
    ///
    /// Forms must be added with [`FormRegistry::register_form`].
    pub fn new() -> Self {
        Self {
            source: None,
            forms: HashMap::new(),
            processors: ProcessorRegistry::new(),
        }
    }

    /// Creates a registry loading definitions from the given source.
    pub fn with_source(source: impl FormSource + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            forms: HashMap::new(),
            processors: ProcessorRegistry::new(),
        }
    }

    /// Registers a prebuilt form under the given key.
    pub fn register_form(&mut self, form_key: impl Into<String>, form: Form) {
        self.forms.insert(form_key.into(), Arc::new(form));
    }

    /// Returns the processor registry for registration.
    pub fn processors_mut(&mut self) -> &mut ProcessorRegistry {
        &mut self.processors
    }

    /// Returns the form model for a key, building and caching it on first
    /// access.
    pub fn form(&mut self, form_key: &str) -> Result<Arc<Form>> {
        if let Some(form) = self.forms.get(form_key) {
            return Ok(form.clone());
        }
        let source = self.source.as_ref().ok_or_else(|| {
            EngineError::Form(formwizard_forms::FormError::DefinitionNotFound(
                form_key.to_string(),
            ))
        })?;
        let form = Arc::new(source.load(form_key)?);
        debug!(form_key, steps = form.steps_count(), "built form model");
        self.forms.insert(form_key.to_string(), form.clone());
        Ok(form)
    }

    /// Returns the pending values for a form.
    pub fn values(&self, session: &dyn SessionStore, form_key: &str) -> ValueMap {
        session.get_or_default(&slot_key(form_key, SLOT_VALUES))
    }

    /// Returns the pending errors for a form.
    pub fn errors(&self, session: &dyn SessionStore, form_key: &str) -> ValidationErrors {
        session.get_or_default(&slot_key(form_key, SLOT_ERRORS))
    }

    /// Returns the current step index for a form.
    pub fn current_step(&self, session: &dyn SessionStore, form_key: &str) -> usize {
        session.get_or_default(&slot_key(form_key, SLOT_CURRENT_STEP))
    }

    /// Returns the set of steps the user may navigate to.
    pub fn available_steps(&self, session: &dyn SessionStore, form_key: &str) -> BTreeSet<usize> {
        session
            .get(&slot_key(form_key, SLOT_AVAILABLE_STEPS))
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_else(|| BTreeSet::from([0]))
    }

    /// Clears progress, values, and errors for a form unconditionally.
    pub fn reset(&self, session: &mut dyn SessionStore, form_key: &str) {
        for slot in [SLOT_VALUES, SLOT_ERRORS, SLOT_CURRENT_STEP, SLOT_AVAILABLE_STEPS] {
            session.remove(&slot_key(form_key, slot));
        }
        debug!(form_key, "form state reset");
    }

    /// Resets a form and seeds values from request parameters.
    ///
    /// Seed keys that do not name a declared field are ignored.
    pub fn initialise(
        &mut self,
        session: &mut dyn SessionStore,
        form_key: &str,
        seed: &ValueMap,
    ) -> Result<()> {
        let form = self.form(form_key)?;
        self.reset(session, form_key);

        let values: ValueMap = seed
            .iter()
            .filter(|(name, _)| form.get_field(name).is_some())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if !values.is_empty() {
            session.set_value(&slot_key(form_key, SLOT_VALUES), &values);
        }
        Ok(())
    }

    /// Submits the current step.
    ///
    /// Submitted values merge into stored values before anything else, so a
    /// backward navigation still records typed-ahead input. Forward
    /// submissions validate the current step and run its processors;
    /// backward navigations do neither.
    pub fn submit_step(
        &mut self,
        session: &mut dyn SessionStore,
        form_key: &str,
        submitted: &ValueMap,
        back: bool,
    ) -> Result<SubmitOutcome> {
        let form = self.form(form_key)?;

        let mut values = self.values(session, form_key);
        for (name, value) in submitted {
            values.insert(name.clone(), value.clone());
        }
        session.set_value(&slot_key(form_key, SLOT_VALUES), &values);

        let current = self.current_step(session, form_key);
        let available = self.available_steps(session, form_key);

        if back {
            let target = current
                .checked_sub(1)
                .ok_or(EngineError::StepNotAvailable(0))?;
            if !available.contains(&target) {
                return Err(EngineError::StepNotAvailable(target));
            }
            session.set_value(&slot_key(form_key, SLOT_CURRENT_STEP), &target);
            debug!(form_key, step = target, "rewound to previous step");
            return Ok(SubmitOutcome::Rewound { step: target });
        }

        let step = form.step_at(current).ok_or(EngineError::OutOfRange {
            requested: current,
            count: form.steps_count(),
        })?;

        let errors = validate(&form.step_fields(current), &values);
        if !errors.is_empty() {
            session.set_value(&slot_key(form_key, SLOT_ERRORS), &errors);
            debug!(form_key, step = current, fields = errors.len(), "step invalid");
            return Ok(SubmitOutcome::Invalid(errors));
        }
        session.remove(&slot_key(form_key, SLOT_ERRORS));

        match self.processors.run(step, form_key, current, &values)? {
            PipelineOutcome::Response(response) => {
                return Ok(SubmitOutcome::Response(response));
            }
            PipelineOutcome::Failed(errors) => {
                session.set_value(&slot_key(form_key, SLOT_ERRORS), &errors);
                debug!(form_key, step = current, "processor failed step");
                return Ok(SubmitOutcome::Invalid(errors));
            }
            PipelineOutcome::Message(message) => {
                return Ok(SubmitOutcome::Message(message));
            }
            PipelineOutcome::Completed => {}
        }

        let target = current + 1;
        if target == form.steps_count() {
            let target_url = form.get_target_url().map(String::from);
            self.reset(session, form_key);
            info!(form_key, "form completed");
            return Ok(SubmitOutcome::Completed { target_url });
        }

        let mut available = available;
        if step.one_way {
            // Passing a one-way step discards every earlier unlock.
            available = BTreeSet::from([target]);
        } else {
            available.insert(target);
        }
        session.set_value(&slot_key(form_key, SLOT_AVAILABLE_STEPS), &available);
        session.set_value(&slot_key(form_key, SLOT_CURRENT_STEP), &target);
        debug!(form_key, step = target, "advanced to next step");

        Ok(SubmitOutcome::Advanced { step: target })
    }

    /// Moves the current step pointer without validating.
    pub fn jump(
        &mut self,
        session: &mut dyn SessionStore,
        form_key: &str,
        requested: usize,
    ) -> Result<()> {
        let form = self.form(form_key)?;
        if requested >= form.steps_count() {
            return Err(EngineError::OutOfRange {
                requested,
                count: form.steps_count(),
            });
        }
        if !self.available_steps(session, form_key).contains(&requested) {
            return Err(EngineError::StepNotAvailable(requested));
        }
        session.set_value(&slot_key(form_key, SLOT_CURRENT_STEP), &requested);
        debug!(form_key, step = requested, "jumped to step");
        Ok(())
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;

    use formwizard_forms::{
        Field, FieldKind, FieldValue, Fieldset, RequiredConstraint, Step,
    };

    fn contact_form() -> Form {
        Form::new("/contact")
            .target_url("/thanks")
            .field(
                Field::new("email", FieldKind::input("email"))
                    .constraint(RequiredConstraint::with_message("Email is required.")),
            )
            .field(Field::new("message", FieldKind::Textarea { rows: 4, cols: 40 }))
            .step(Step::new().fieldset(Fieldset::new().field("email")))
            .step(Step::new().fieldset(Fieldset::new().field("message")))
    }

    fn registry_with(form: Form) -> FormRegistry {
        let mut registry = FormRegistry::new();
        registry.register_form("contact", form);
        registry
    }

    fn single(value: &str) -> ValueMap {
        let mut values = ValueMap::new();
        values.insert("email".to_string(), FieldValue::from(value));
        values
    }

    #[test]
    fn test_initialise_round_trip() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        registry
            .initialise(&mut session, "contact", &ValueMap::new())
            .unwrap();

        assert_eq!(registry.values(&session, "contact"), ValueMap::new());
        assert_eq!(registry.errors(&session, "contact"), ValidationErrors::new());
        assert_eq!(registry.current_step(&session, "contact"), 0);
        assert_eq!(
            registry.available_steps(&session, "contact"),
            BTreeSet::from([0])
        );
    }

    #[test]
    fn test_initialise_seeds_declared_fields_only() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        let mut seed = ValueMap::new();
        seed.insert("email".to_string(), FieldValue::from("a@b.com"));
        seed.insert("utm-source".to_string(), FieldValue::from("ad"));
        registry.initialise(&mut session, "contact", &seed).unwrap();

        let values = registry.values(&session, "contact");
        assert_eq!(values.get("email"), Some(&FieldValue::from("a@b.com")));
        assert_eq!(values.get("utm-source"), None);
    }

    #[test]
    fn test_invalid_submission_stores_errors_and_stays() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        let outcome = registry
            .submit_step(&mut session, "contact", &single(""), false)
            .unwrap();

        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(
                    errors.get("email"),
                    Some(&vec!["Email is required.".to_string()])
                );
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(registry.current_step(&session, "contact"), 0);
        assert!(!registry.errors(&session, "contact").is_empty());
    }

    #[test]
    fn test_valid_submission_advances_and_clears_errors() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        registry
            .submit_step(&mut session, "contact", &single(""), false)
            .unwrap();
        let outcome = registry
            .submit_step(&mut session, "contact", &single("a@b.com"), false)
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Advanced { step: 1 }));
        assert_eq!(registry.current_step(&session, "contact"), 1);
        assert_eq!(
            registry.available_steps(&session, "contact"),
            BTreeSet::from([0, 1])
        );
        assert!(registry.errors(&session, "contact").is_empty());
    }

    #[test]
    fn test_back_records_typed_ahead_values() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        registry
            .submit_step(&mut session, "contact", &single("a@b.com"), false)
            .unwrap();

        let mut typed = ValueMap::new();
        typed.insert("message".to_string(), FieldValue::from("draft text"));
        let outcome = registry
            .submit_step(&mut session, "contact", &typed, true)
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Rewound { step: 0 }));
        assert_eq!(registry.current_step(&session, "contact"), 0);
        assert_eq!(
            registry.values(&session, "contact").get("message"),
            Some(&FieldValue::from("draft text"))
        );
    }

    #[test]
    fn test_back_from_first_step_fails() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        let err = registry
            .submit_step(&mut session, "contact", &ValueMap::new(), true)
            .unwrap_err();
        assert!(matches!(err, EngineError::StepNotAvailable(_)));
    }

    #[test]
    fn test_completion_resets_state_and_reports_target() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        registry
            .submit_step(&mut session, "contact", &single("a@b.com"), false)
            .unwrap();
        let outcome = registry
            .submit_step(&mut session, "contact", &ValueMap::new(), false)
            .unwrap();

        match outcome {
            SubmitOutcome::Completed { target_url } => {
                assert_eq!(target_url.as_deref(), Some("/thanks"));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(registry.values(&session, "contact"), ValueMap::new());
        assert_eq!(registry.current_step(&session, "contact"), 0);
        assert_eq!(
            registry.available_steps(&session, "contact"),
            BTreeSet::from([0])
        );
    }

    #[test]
    fn test_jump_bounds_and_availability() {
        let mut registry = registry_with(contact_form());
        let mut session = MemorySession::new();

        assert!(matches!(
            registry.jump(&mut session, "contact", 5).unwrap_err(),
            EngineError::OutOfRange { requested: 5, .. }
        ));
        assert!(matches!(
            registry.jump(&mut session, "contact", 1).unwrap_err(),
            EngineError::StepNotAvailable(1)
        ));

        registry
            .submit_step(&mut session, "contact", &single("a@b.com"), false)
            .unwrap();
        registry.jump(&mut session, "contact", 0).unwrap();
        assert_eq!(registry.current_step(&session, "contact"), 0);
    }

    #[test]
    fn test_unknown_form_key() {
        let mut registry = FormRegistry::new();
        let mut session = MemorySession::new();

        let err = registry
            .submit_step(&mut session, "ghost", &ValueMap::new(), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::Form(_)));
    }

    #[test]
    fn test_form_model_is_cached() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingSource(Arc<AtomicUsize>);
        impl FormSource for CountingSource {
            fn load(&self, _form_key: &str) -> formwizard_forms::Result<Form> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(contact_form())
            }
        }

        let builds = Arc::new(AtomicUsize::new(0));
        let mut registry = FormRegistry::with_source(CountingSource(builds.clone()));
        registry.form("contact").unwrap();
        registry.form("contact").unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }
}
