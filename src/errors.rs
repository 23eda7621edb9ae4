use axum::http::StatusCode;
use thiserror::Error;

/// Failures inside the day-record store and its storage adapter.
///
/// None of these are fatal: the store logs them and keeps serving the
/// in-memory mapping.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read study data: {0}")]
    StorageRead(String),

    #[error("failed to write study data: {0}")]
    StorageWrite(String),

    #[error("failed to parse imported data: {0}")]
    ImportParse(#[source] serde_json::Error),

    #[error("invalid minutes input: {0:?}")]
    InvalidMinutesInput(String),

    #[error("invalid date key: {0:?}")]
    InvalidDateKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDateKey(_)
            | StoreError::InvalidMinutesInput(_)
            | StoreError::ImportParse(_) => Self::bad_request(err.to_string()),
            other => Self::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
