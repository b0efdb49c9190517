//! Translation of errors into HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Error;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error kind.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// An error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A 400 response for a request that could not be decoded.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Status code of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            Error::Duplicated { .. } => {
                Self::new(StatusCode::CONFLICT, "DUPLICATED", err.to_string())
            }
            Error::InUse { .. } => Self::new(StatusCode::CONFLICT, "IN_USE", err.to_string()),
            Error::Validation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
            }
            _ => {
                error!("Request failed: {}", err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (Error::not_found("theme", 1), StatusCode::NOT_FOUND),
            (Error::duplicated("theme"), StatusCode::CONFLICT),
            (Error::in_use("theme", 1), StatusCode::CONFLICT),
            (Error::validation("bad"), StatusCode::BAD_REQUEST),
            (Error::LockPoisoned, StatusCode::INTERNAL_SERVER_ERROR),
            (Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let api = ApiError::from(Error::internal("secret stack detail"));
        assert_eq!(api.message, "internal server error");
        assert_eq!(api.code, "INTERNAL_ERROR");
    }

    #[test]
    fn test_client_message_names_resource() {
        let api = ApiError::from(Error::not_found("reservationTime", 4));
        assert_eq!(api.code, "NOT_FOUND");
        assert!(api.message.contains("reservationTime"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
