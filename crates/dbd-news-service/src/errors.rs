use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::query::QueryError;

/// Faults raised by the persisted store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Failed to connect to database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Failed to run migrations: {0}")]
    Migration(String),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound(message) => ApiError::NotFound(message),
            QueryError::Store(err) => ApiError::Store(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Store(ref err) => {
                // Log the detailed error but don't expose it to the client
                error!(error = %err, "Store error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch news".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
