use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::omdb::ProviderError;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Unauthorized,
    NotFound(String),
    Upstream(ProviderError),
    Database(sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized: invalid credential" })),
            )
                .into_response(),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Upstream(e) => {
                tracing::error!("Metadata provider error: {e}");
                internal_error(e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                internal_error(e.to_string())
            }
        }
    }
}

fn internal_error(details: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "An internal server error occurred", "details": details })),
    )
        .into_response()
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::Upstream(e)
    }
}
