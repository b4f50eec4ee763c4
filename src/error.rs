// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::grading::letter::QuestionNumber;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (operation not valid in the current state)
    Conflict(String),

    // 502 Bad Gateway (the vision model failed us)
    BadGateway(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Errors raised by the answer-key store, the test session and the key sources.
///
/// None of these are fatal: the caller gets the error back and the state the
/// operation was applied to is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradingError {
    /// The operation is not valid for its arguments or the current state.
    PreconditionViolation(String),

    /// The question is not part of the current key.
    UnknownQuestion(QuestionNumber),

    /// A loaded answer-key document has the wrong shape.
    MalformedDocument(String),

    /// The recognition source produced nothing usable.
    ExtractionFailure(String),
}

impl GradingError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        GradingError::PreconditionViolation(msg.into())
    }
}

impl fmt::Display for GradingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingError::PreconditionViolation(msg) => write!(f, "{}", msg),
            GradingError::UnknownQuestion(q) => {
                write!(f, "Question {} is not part of the answer key", q)
            }
            GradingError::MalformedDocument(msg) => {
                write!(f, "Invalid answer key document: {}", msg)
            }
            GradingError::ExtractionFailure(msg) => {
                write!(f, "Failed to process image with AI: {}", msg)
            }
        }
    }
}

impl std::error::Error for GradingError {}

impl From<GradingError> for AppError {
    fn from(err: GradingError) -> Self {
        let msg = err.to_string();
        match err {
            GradingError::PreconditionViolation(_) => AppError::Conflict(msg),
            GradingError::UnknownQuestion(_) => AppError::NotFound(msg),
            GradingError::MalformedDocument(_) => AppError::BadRequest(msg),
            GradingError::ExtractionFailure(_) => AppError::BadGateway(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grading_error_status_mapping() {
        let cases = [
            (
                GradingError::precondition("Answer key is empty"),
                StatusCode::CONFLICT,
            ),
            (GradingError::UnknownQuestion(7), StatusCode::NOT_FOUND),
            (
                GradingError::MalformedDocument("not an object".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GradingError::ExtractionFailure("timeout".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_unknown_question_message() {
        let msg = GradingError::UnknownQuestion(42).to_string();
        assert_eq!(msg, "Question 42 is not part of the answer key");
    }
}
