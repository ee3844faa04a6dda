use std::num::ParseIntError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use todo_core::StorageError;

/// Everything a todo handler can fail with, and the status each maps to.
///
/// Bodies carry the raw error text, storage errors included.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    BadId(#[from] ParseIntError),

    /// JSON bodies that fail to decode are a server error on this API.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("message cant be empty")]
    EmptyMessage,

    #[error("todo not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::BadId(_) => StatusCode::BAD_REQUEST,
            HandlerError::Decode(_) | HandlerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::EmptyMessage => StatusCode::NO_CONTENT,
            HandlerError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // 204 cannot carry a body and 404 is sent bare
            HandlerError::EmptyMessage | HandlerError::NotFound => status.into_response(),
            other => (status, other.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        let bad_id = "x".parse::<i64>().unwrap_err();
        assert_eq!(HandlerError::from(bad_id).status(), StatusCode::BAD_REQUEST);
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(HandlerError::from(decode).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(HandlerError::EmptyMessage.status(), StatusCode::NO_CONTENT);
        assert_eq!(HandlerError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            HandlerError::from(StorageError::RowsAffected(0)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_error_text_is_the_body() {
        let err = HandlerError::from(StorageError::RowsAffected(0));
        assert_eq!(err.to_string(), "expected to affect 1 row, affected 0");
    }
}
