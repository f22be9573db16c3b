use thiserror::Error;

use crate::answers::Field;

/// Errors raised while building sequences or driving a quote session
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The current step's requirements are not met, so it cannot be left yet
    #[error("Step '{step}' is not ready, missing: {}", missing.join(", "))]
    NotReady { step: String, missing: Vec<String> },

    /// Every step is answered; go back before changing anything
    #[error("All steps are complete, go back to change an answer")]
    SessionComplete,

    #[error("Step index {index} is out of range for a sequence of {len} steps")]
    OutOfRange { index: usize, len: usize },

    #[error("Cannot read {value:?} as a value for {field}")]
    Coercion { field: Field, value: String },

    #[error("Field {field} is not asked by step '{step}'")]
    FieldNotInStep { field: Field, step: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Additional driver {0} not found")]
    DriverNotFound(usize),

    #[error("Additional drivers are not being collected on this step")]
    DriversDisabled,

    #[error("Step '{0}' asks more than one question, answer a field explicitly")]
    NotSingleQuestion(String),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Sequence table could not be parsed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session belongs to sequence '{session}', not '{sequence}'")]
    SequenceMismatch { session: String, sequence: String },
}

pub type Result<T> = std::result::Result<T, QuoteError>;
