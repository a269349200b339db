//! HTTP error surface.
//!
//! Two response envelopes coexist: `{ "success": false, "message": ... }`
//! for service errors and the legacy `{ "error": ... }` shape used by field
//! validation and the authentication gate. Unexpected errors are logged and
//! collapsed into a generic 500 so internals never leak.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, async_trait};
use serde_json::{Value, json};
use thiserror::Error;

use chronos_core::error::CoreError;
use chronos_db::error::DbError;
use chronos_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    /// Request-shape validation, rendered in the legacy envelope.
    #[error("{0}")]
    FieldValidation(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

fn envelope(message: &str) -> Value {
    json!({ "success": false, "message": message })
}

fn legacy(message: &str) -> Value {
    json!({ "error": message })
}

fn core_response(error: &CoreError) -> (StatusCode, Value) {
    match error {
        CoreError::NotAuthenticated => (
            StatusCode::UNAUTHORIZED,
            legacy("Not authenticated. Please log in"),
        ),
        CoreError::AccessDenied(msg) => (StatusCode::FORBIDDEN, envelope(msg)),
        CoreError::RegionalImmutable(msg) => (StatusCode::FORBIDDEN, envelope(msg)),
        CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, envelope(msg)),
        CoreError::ValidationError(msg) => (StatusCode::BAD_REQUEST, envelope(msg)),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, envelope(msg)),
        CoreError::InvalidConfiguration(_) | CoreError::InvariantViolation(_) => {
            tracing::error!(error = %error, "Unexpected core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                envelope("Internal server error"),
            )
        }
    }
}

fn db_response(error: &DbError) -> (StatusCode, Value) {
    match error {
        DbError::NotFound(_) => (StatusCode::NOT_FOUND, envelope("Not found")),
        DbError::Duplicate(field) => (
            StatusCode::CONFLICT,
            envelope(&format!("{field} is already in use")),
        ),
        DbError::CoreError(core) => core_response(core),
    }
}

fn service_response(error: &ServiceError) -> (StatusCode, Value) {
    match error {
        ServiceError::NotAuthenticated => (
            StatusCode::UNAUTHORIZED,
            legacy("Not authenticated. Please log in"),
        ),
        ServiceError::AccessDenied(msg) => (StatusCode::FORBIDDEN, envelope(msg)),
        ServiceError::RegionalImmutable(msg) => (StatusCode::FORBIDDEN, envelope(msg)),
        ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, envelope(msg)),
        ServiceError::ValidationError(msg) => (StatusCode::BAD_REQUEST, envelope(msg)),
        ServiceError::Conflict(msg) => (StatusCode::CONFLICT, envelope(msg)),
        ServiceError::DatabaseError(db) => db_response(db),
        ServiceError::CoreError(core) => core_response(core),
        ServiceError::UpstreamUnavailable(_)
        | ServiceError::InvalidConfiguration(_)
        | ServiceError::InvariantViolation(_) => {
            tracing::error!(error = %error, "Unexpected service error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                envelope("Internal server error"),
            )
        }
    }
}

impl AppError {
    #[must_use]
    fn response(&self) -> (StatusCode, Value) {
        match self {
            Self::FieldValidation(msg) => (StatusCode::BAD_REQUEST, legacy(msg)),
            Self::ServiceError(e) => service_response(e),
            Self::DatabaseError(e) => db_response(e),
            Self::CoreError(e) => core_response(e),
        }
    }
}

#[async_trait]
impl salvo::Writer for AppError {
    async fn write(mut self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let (status, body) = self.response();
        res.status_code(status);
        res.render(Json(body));
    }
}
