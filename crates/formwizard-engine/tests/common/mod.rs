#![allow(dead_code)]

use formwizard_engine::{FormRegistry, MemorySession, SubmitOutcome};
use formwizard_forms::{
    Field, FieldKind, FieldValue, Fieldset, Form, ProcessorSpec, RequiredConstraint, Step,
    ValueMap,
};

/// A 2-step form: step 0 requires `email`, step 1 is one-way and runs the
/// named processor.
pub fn signup_form(processor: &str) -> Form {
    Form::new("/signup")
        .target_url("/welcome")
        .field(
            Field::new("email", FieldKind::input("email"))
                .constraint(RequiredConstraint::with_message("Email is required.")),
        )
        .field(Field::new("notes", FieldKind::Textarea { rows: 4, cols: 40 }))
        .step(Step::new().fieldset(Fieldset::new().heading("Account").field("email")))
        .step(
            Step::new()
                .fieldset(Fieldset::new().field("notes"))
                .processor(ProcessorSpec::new(processor))
                .one_way(),
        )
}

pub fn values(pairs: &[(&str, &str)]) -> ValueMap {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), FieldValue::from(*value)))
        .collect()
}

/// Asserts the registry invariant: the current step is available and in
/// range.
pub fn assert_invariant(
    registry: &FormRegistry,
    session: &MemorySession,
    form_key: &str,
    steps_count: usize,
) {
    let current = registry.current_step(session, form_key);
    let available = registry.available_steps(session, form_key);
    assert!(
        available.contains(&current),
        "current step {current} not in available set {available:?}"
    );
    assert!(current < steps_count, "current step {current} out of range");
    assert!(
        available.iter().all(|step| *step < steps_count),
        "available set {available:?} exceeds range"
    );
}

pub fn expect_advanced(outcome: SubmitOutcome) -> usize {
    match outcome {
        SubmitOutcome::Advanced { step } => step,
        other => panic!("expected Advanced, got {other:?}"),
    }
}
