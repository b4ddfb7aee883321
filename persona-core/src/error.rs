//! Error types for the persona calendar.

use thiserror::Error;

/// Errors that can occur in persona calendar operations.
#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("{0}")]
    Validation(String),

    #[error("Persona not found: {0}")]
    PersonaNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Remote calendar error: {0}")]
    Remote(String),

    #[error("Time error: {0}")]
    Time(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl PersonaError {
    /// True for the variants that mean "the thing you asked for does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PersonaError::PersonaNotFound(_) | PersonaError::EventNotFound(_)
        )
    }
}

impl From<serde_json::Error> for PersonaError {
    fn from(err: serde_json::Error) -> Self {
        PersonaError::Serialization(err.to_string())
    }
}

/// Result type alias for persona calendar operations.
pub type PersonaResult<T> = Result<T, PersonaError>;
