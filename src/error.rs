use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ApiResponse;

/// Failures raised by the persistence collaborator
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Typed result of every store operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not authenticated")]
    AuthRequired,

    #[error("remote call failed: {0}")]
    Remote(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("unknown date range '{token}'{}", suggestion_hint(.suggestion))]
    UnknownDateRange {
        token: String,
        suggestion: Option<&'static str>,
    },
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|s| format!(", did you mean '{s}'?"))
        .unwrap_or_default()
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        StoreError::Remote(err.to_string())
    }
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::AuthRequired => StatusCode::UNAUTHORIZED,
            StoreError::Remote(_) => StatusCode::BAD_GATEWAY,
            StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::UnknownDateRange { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ApiResponse::error(self.to_string()))).into_response()
    }
}
