//! Error types for fillkit.

use thiserror::Error;

/// Result type alias using fillkit's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fillkit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No form fields discoverable by any strategy. Terminal for a session.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A supplied answer does not match the field's declared type.
    #[error("Answer validation error for field '{field_id}': {reason}")]
    AnswerValidation { field_id: String, reason: String },

    /// The external document writer failed. The catalog remains valid for retry.
    #[error("Write error: {0}")]
    Write(String),

    /// Filing failed after the document was written. Written state is preserved.
    #[error("Filing error: {0}")]
    Filing(String),

    /// A storage backend operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A lifecycle method was invoked in a state that does not permit it.
    #[error("Invalid transition: cannot {operation} while {state}")]
    InvalidTransition { state: String, operation: String },

    /// A strict-completion write was requested with required fields missing.
    #[error("Incomplete session: {0} required field(s) missing")]
    Incomplete(usize),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an invalid-transition error.
    pub fn invalid_transition(state: impl Into<String>, operation: impl Into<String>) -> Self {
        Error::InvalidTransition {
            state: state.into(),
            operation: operation.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
