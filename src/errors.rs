use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::JsonResponse;

/// Failures surfaced by models and controllers.
///
/// The `Display` text of each variant is what clients receive, either as a
/// bare JSON string or as the `message` of a create envelope.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    NotAuthorized(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidQuery(&'static str),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("model `{0}` is not registered")]
    Unregistered(String),
    #[error("{0}")]
    RunTimeError(&'static str),
    #[error("Internal Server Error")]
    ServerError,
    #[error("{0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    /// Status-coded rendering, used where the framework rejects a request
    /// before a controller runs.
    pub fn to_json_response(&self) -> JsonResponse<String> {
        let status_code = match self {
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            RequestError::Validation(_)
            | RequestError::InvalidQuery(_)
            | RequestError::UnknownField(_)
            | RequestError::RunTimeError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::Unregistered(_) | RequestError::ServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RequestError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status_code, Json(self.to_string()))
    }

    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                e.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }
}
