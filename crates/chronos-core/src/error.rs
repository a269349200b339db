use thiserror::Error;

/// Core error type with minimal dependencies
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    /// Mutation attempted against a synthesized regional calendar or event.
    /// The message is fixed per entity kind and must be surfaced verbatim.
    #[error("{0}")]
    RegionalImmutable(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
