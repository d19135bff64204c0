use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Database(DbError::CallerMisuse(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Database(DbError::NotFound) => (
                StatusCode::NOT_FOUND,
                "The requested data was not found".to_string(),
            ),
            AppError::Database(DbError::ConstraintViolation(message)) => {
                tracing::warn!(error = %message, "Constraint violation.");
                (StatusCode::CONFLICT, message)
            }
            AppError::Database(db_err @ DbError::Connectivity(_)) => {
                tracing::error!(error = ?db_err, "Database unavailable.");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The database is temporarily unavailable".to_string(),
                )
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
