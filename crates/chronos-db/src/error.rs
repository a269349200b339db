use thiserror::Error;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate unique field: {0}")]
    Duplicate(String),

    #[error(transparent)]
    CoreError(#[from] chronos_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
