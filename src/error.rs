//! Structured error kinds for the generation core (spec.md §7).

use thiserror::Error;

use crate::checksum::Violation;

/// A single field-path/actual/expected triple attached to a validation error.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Every failure mode the core can surface. No variant is recovered silently
/// inside a pass — callers see the structured kind, a message, and whatever
/// details apply.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelveError {
    #[error("config invalid: {0:?}")]
    ConfigInvalid(Vec<FieldError>),

    #[error("seed invalid: {message}")]
    SeedInvalid { message: String },

    #[error("seed encode failed: {message}")]
    SeedEncodeFailed { message: String },

    #[error("seed decode failed: {message}")]
    SeedDecodeFailed { message: String },

    #[error("pipeline type mismatch: pass {pass_id:?} expected input {expected:?}, chain produced {actual:?}")]
    PipelineTypeMismatch { pass_id: String, expected: String, actual: String },

    #[error("pipeline stream missing: pass {pass_id:?} requires stream {stream:?}")]
    PipelineStreamMissing { pass_id: String, stream: String },

    #[error("generation failed in pass {pass_id:?}: {message}")]
    GenerationFailed { pass_id: String, message: String },

    #[error("invariant violation(s): {0:?}")]
    InvariantViolation(Vec<Violation>),

    #[error("generation cancelled")]
    GenerationCancelled,
}

pub type DelveResult<T> = Result<T, DelveError>;
