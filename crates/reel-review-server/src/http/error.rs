use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reel_review_core::ServiceError;
use serde_json::json;
use tracing::error;

pub const INVALID_TOKEN: &str = "Invalid token.";

/// Error returned by handlers.
///
/// Not-found and forbidden outcomes carry `{message}`; a missing or invalid
/// bearer token is a 401 with `{err}`. Everything else, validation failures
/// included, collapses to a 500 with `{err}`.
#[derive(Debug)]
pub enum AppError {
    Service(ServiceError),
    Unauthorized,
    /// Body or query string that could not be decoded
    Malformed(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "err": INVALID_TOKEN }))).into_response()
            }
            AppError::Service(ServiceError::NotFound(message)) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            AppError::Service(ServiceError::Forbidden(message)) => {
                (StatusCode::FORBIDDEN, Json(json!({ "message": message }))).into_response()
            }
            AppError::Malformed(reason) => {
                error!(error = %reason, "Rejected malformed request");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "err": reason }))).into_response()
            }
            AppError::Service(err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "err": err.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
