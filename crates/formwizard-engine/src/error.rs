//! Error types for the form engine.

use thiserror::Error;

use crate::processor::ProcessorError;

/// Errors raised by registry transitions and the processor pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested step exists but is not currently available.
    ///
    /// Raised on backward navigation into a one-way-locked step, or a jump
    /// to a step that has not been unlocked yet. Indicates a forged request
    /// or a stale UI, not a normal user path.
    #[error("step {0} is not available")]
    StepNotAvailable(usize),

    /// The requested step index is outside the form's step range.
    #[error("step {requested} is out of range (form has {count} steps)")]
    OutOfRange { requested: usize, count: usize },

    /// A step names a processor missing from the registry.
    #[error("unknown processor `{0}`")]
    UnknownProcessor(String),

    /// A processor failed under the `Rethrow` policy.
    #[error("processor `{name}` failed")]
    Processor {
        name: String,
        #[source]
        source: ProcessorError,
    },

    /// The form model could not be loaded or built.
    #[error(transparent)]
    Form(#[from] formwizard_forms::FormError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
