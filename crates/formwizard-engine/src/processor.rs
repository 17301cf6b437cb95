//! Step processors and the execution pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use formwizard_forms::{ExceptionAction, ProcessorSpec, Step, ValidationErrors, ValueMap};

use crate::error::{EngineError, Result};
use crate::response::Response;

/// A recoverable failure raised by a processor.
///
/// The pipeline catches this type only; any other fault in a processor is a
/// programming error and propagates as a panic.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProcessorError {
    /// Human-readable failure description.
    pub message: String,
}

impl ProcessorError {
    /// Creates a new failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything a processor invocation can see.
///
/// An explicit context struct replaces positional/typed argument matching:
/// every processor receives the same shape and picks what it needs.
#[derive(Debug)]
pub struct ProcessorContext<'a> {
    /// Key of the form being submitted.
    pub form_key: &'a str,
    /// Index of the step whose pipeline is running.
    pub step: usize,
    /// Merged form values at submission time.
    pub values: &'a ValueMap,
    /// Fixed arguments from the processor's definition.
    pub arguments: &'a serde_json::Map<String, serde_json::Value>,
}

impl ProcessorContext<'_> {
    /// Returns a string argument from the definition's argument map.
    pub fn argument_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(serde_json::Value::as_str)
    }
}

/// A callable executed after a step validates.
pub trait FormProcessor: Send + Sync {
    /// Runs the processor.
    ///
    /// Returning `Some(response)` short-circuits the pipeline; the response
    /// goes straight back to the caller. Returning `Err` invokes the
    /// processor's configured exception action.
    fn process(
        &self,
        context: &ProcessorContext<'_>,
    ) -> std::result::Result<Option<Response>, ProcessorError>;
}

impl<F> FormProcessor for F
where
    F: Fn(&ProcessorContext<'_>) -> std::result::Result<Option<Response>, ProcessorError>
        + Send
        + Sync,
{
    fn process(
        &self,
        context: &ProcessorContext<'_>,
    ) -> std::result::Result<Option<Response>, ProcessorError> {
        self(context)
    }
}

/// Outcome of running a step's processor pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Every active processor ran without failure or response.
    Completed,
    /// A processor returned a response; the remaining processors did not run.
    Response(Response),
    /// A processor failed under the `Fail` policy; the step must not advance.
    Failed(ValidationErrors),
    /// A processor failed under the `Message` policy; re-render with this
    /// form-level message.
    Message(String),
}

/// Name-to-processor registry.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn FormProcessor>>,
}

impl ProcessorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a processor under the given name.
    pub fn register(&mut self, name: impl Into<String>, processor: impl FormProcessor + 'static) {
        self.processors.insert(name.into(), Arc::new(processor));
    }

    /// Looks up a processor by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn FormProcessor>> {
        self.processors.get(name).cloned()
    }

    /// Runs a step's processors in declared order.
    ///
    /// Inactive processors (condition false) are skipped. The first response
    /// stops the pipeline. A `ProcessorError` is handled per the processor's
    /// configured exception action; `Fail` and `Message` also stop the
    /// pipeline, since a failed step must not keep executing side-effectful
    /// processors.
    pub fn run(
        &self,
        step: &Step,
        form_key: &str,
        step_index: usize,
        values: &ValueMap,
    ) -> Result<PipelineOutcome> {
        for spec in &step.processors {
            if !spec.applies(values) {
                debug!(processor = %spec.name, "skipping inactive processor");
                continue;
            }

            let processor = self
                .get(&spec.name)
                .ok_or_else(|| EngineError::UnknownProcessor(spec.name.clone()))?;

            let context = ProcessorContext {
                form_key,
                step: step_index,
                values,
                arguments: &spec.arguments,
            };

            match processor.process(&context) {
                Ok(Some(response)) => {
                    debug!(processor = %spec.name, "processor returned a response");
                    return Ok(PipelineOutcome::Response(response));
                }
                Ok(None) => {}
                Err(error) => return self.handle_failure(spec, error),
            }
        }

        Ok(PipelineOutcome::Completed)
    }

    fn handle_failure(&self, spec: &ProcessorSpec, error: ProcessorError) -> Result<PipelineOutcome> {
        match spec.exception_action {
            ExceptionAction::Rethrow => Err(EngineError::Processor {
                name: spec.name.clone(),
                source: error,
            }),
            ExceptionAction::Fail => {
                let mut errors = ValidationErrors::new();
                if spec.error_fields.is_empty() {
                    errors.add_global(&error.message);
                } else {
                    for field in &spec.error_fields {
                        errors.add(field, &error.message);
                    }
                }
                Ok(PipelineOutcome::Failed(errors))
            }
            ExceptionAction::Message => Ok(PipelineOutcome::Message(error.message)),
            ExceptionAction::Ignore => {
                debug!(processor = %spec.name, error = %error, "ignoring processor failure");
                Ok(PipelineOutcome::Completed)
            }
        }
    }
}
