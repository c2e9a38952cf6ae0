use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::ItemId;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Raised when a keyword or genre comparison has nothing to divide by.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Account '{username}' has already reviewed item {item}")]
    AlreadyLinked { username: String, item: ItemId },

    #[error("Account '{0}' has no favorites and no reviews rated above 4")]
    EmptyPreferenceSource(String),

    #[error("Account '{0}' has no priority mass to derive weights from")]
    ZeroPriorityMass(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) | AppError::InvalidQuery(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::AlreadyLinked { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::EmptyPreferenceSource(_) | AppError::ZeroPriorityMass(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Catalog(_) | AppError::Io(_) | AppError::Json(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
