//! Error types for the place directory service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed or incompatible pagination cursor. Kept distinct from
    /// `Validation` so callers can tell "restart pagination from the first
    /// page" apart from "fix the request".
    #[error("Invalid cursor: {0}")]
    CursorDecode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "invalid-request",
            Error::CursorDecode(_) => "invalid-cursor",
            Error::NotFound(_) => "not-found",
            Error::Database(_) | Error::Internal(_) | Error::Other(_) => "internal",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Validation(_) | Error::CursorDecode(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Database(_) | Error::Internal(_) | Error::Other(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_errors_are_distinct_from_validation() {
        let cursor = Error::CursorDecode("bad token".into());
        let validation = Error::Validation("bad size".into());
        assert_eq!(cursor.code(), "invalid-cursor");
        assert_eq!(validation.code(), "invalid-request");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = Error::Internal("connection pool exhausted".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
