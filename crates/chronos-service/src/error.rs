use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] chronos_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] chronos_core::error::CoreError),

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

    /// Mutation attempted against a regional (virtual) id; fixed message.
    #[error("{0}")]
    RegionalImmutable(&'static str),

    /// Upstream holiday feed unreachable. Read paths swallow this and
    /// degrade; it never reaches the API boundary on a listing.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
