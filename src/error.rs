//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{auth::capability::CapabilityError, services::transfer_service::TransferFailure};

/// What a failed downstream call tells us about the remote side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The request was refused or never reached the service; nothing was applied.
    Rejected,
    /// The request may have been applied: it was sent but no usable answer came back.
    Indeterminate,
}

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in any of the
/// services. Each variant maps to a specific HTTP status code and error code.
///
/// # Error Categories
///
/// - **Validation Errors**: missing or malformed request fields
/// - **Access Errors**: the authorization gate refused the caller
/// - **Resource Errors**: requested record does not exist
/// - **Downstream Errors**: a call to a collaborator service failed
/// - **Persistence Errors**: any sqlx::Error from local writes and reads
/// - **Transfer Errors**: a failed saga step, with how far the saga got
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request. No downstream call has been made.
    #[error("{0}")]
    Validation(String),

    /// The authorization gate returned `accessGranted = false`.
    ///
    /// Returns HTTP 401 Unauthorized and carries both booleans so the caller
    /// can tell an unknown credential from a missing permission.
    #[error("Access denied")]
    AccessDenied { authenticated: bool, authorized: bool },

    /// Requested record does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A call to a collaborator service did not complete successfully.
    ///
    /// Returns HTTP 500. Never retried for mutations.
    #[error("{service} call failed: {message}")]
    Downstream {
        service: &'static str,
        message: String,
        outcome: Outcome,
    },

    /// Local database operation failed.
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute.
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Server-side misconfiguration or an unexpected local failure.
    ///
    /// Returns HTTP 500.
    #[error("{0}")]
    Internal(String),

    /// A transfer saga stopped part-way.
    #[error(transparent)]
    Transfer(Box<TransferFailure>),
}

impl AppError {
    /// The collaborator answered and did not apply the request.
    pub fn downstream(service: &'static str, message: impl Into<String>) -> Self {
        AppError::Downstream {
            service,
            message: message.into(),
            outcome: Outcome::Rejected,
        }
    }

    /// The request left this process but its effect on the collaborator is unknown.
    pub fn indeterminate(service: &'static str, message: impl Into<String>) -> Self {
        AppError::Downstream {
            service,
            message: message.into(),
            outcome: Outcome::Indeterminate,
        }
    }

    /// Whether the failed call may still have taken effect remotely.
    ///
    /// Everything other than an unanswered downstream call was a definite
    /// refusal.
    pub fn outcome(&self) -> Outcome {
        match self {
            AppError::Downstream { outcome, .. } => *outcome,
            AppError::Transfer(failure) => failure.cause.outcome(),
            _ => Outcome::Rejected,
        }
    }

    pub fn access_denied(authenticated: bool, authorized: bool) -> Self {
        AppError::AccessDenied {
            authenticated,
            authorized,
        }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AccessDenied { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Downstream { .. }
            | AppError::Persistence(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Transfer(failure) => failure.cause.status(),
        }
    }

    /// Machine-readable error code placed in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_request",
            AppError::AccessDenied { .. } => "access_denied",
            AppError::NotFound(_) => "not_found",
            AppError::Downstream { .. } => "downstream_failure",
            AppError::Persistence(_) | AppError::Internal(_) => "internal_error",
            AppError::Transfer(failure) => failure.cause.code(),
        }
    }

    fn body(&self) -> Value {
        match self {
            AppError::AccessDenied {
                authenticated,
                authorized,
            } => json!({
                "message": "accessDenied",
                "authenticated": authenticated,
                "authorized": authorized,
                "error": { "code": self.code(), "message": self.to_string() }
            }),
            AppError::Persistence(e) => {
                // Hide database details from clients
                tracing::error!(error = %e, "persistence failure");
                json!({
                    "error": { "code": self.code(), "message": "An internal error occurred" }
                })
            }
            AppError::Transfer(failure) => {
                let mut body = failure.cause.body();
                if let Value::Object(ref mut map) = body {
                    map.insert("transfer".to_string(), failure.summary());
                }
                body
            }
            _ => json!({
                "error": { "code": self.code(), "message": self.to_string() }
            }),
        }
    }
}

/// Malformed or incomplete JSON bodies are validation failures.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<CapabilityError> for AppError {
    fn from(e: CapabilityError) -> Self {
        AppError::Internal(format!("capability token: {e}"))
    }
}

impl From<TransferFailure> for AppError {
    fn from(failure: TransferFailure) -> Self {
        AppError::Transfer(Box::new(failure))
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// `AccessDenied` additionally carries `authenticated` and `authorized`,
/// and transfer failures carry a `transfer` object describing the saga.
///
/// # Status Code Mapping
///
/// - `Validation` → 400 Bad Request
/// - `AccessDenied` → 401 Unauthorized
/// - `NotFound` → 404 Not Found
/// - `Downstream`, `Persistence`, `Internal` → 500 Internal Server Error
/// - `Transfer` → status of the step that failed
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn access_denied_exposes_both_flags() {
        let (status, body) = render(AppError::access_denied(true, false)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "accessDenied");
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["authorized"], false);
        assert_eq!(body["error"]["code"], "access_denied");
    }

    #[tokio::test]
    async fn persistence_errors_hide_details() {
        let (status, body) = render(AppError::Persistence(sqlx::Error::PoolTimedOut)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal_error");
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn transfer_failure_keeps_cause_status() {
        use crate::services::transfer_service::TransferState;

        let failure = TransferFailure {
            reached: TransferState::Started,
            compensated: Some(false),
            transaction_id: None,
            cause: AppError::access_denied(false, false),
        };
        let (status, body) = render(failure.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "access_denied");
        assert_eq!(body["transfer"]["reached"], "started");
        assert_eq!(body["transfer"]["fundsMoved"], false);
        assert_eq!(body["transfer"]["outcome"], "rejected");
        assert!(body["transfer"]["transactionID"].is_null());
    }

    #[test]
    fn only_unanswered_calls_are_indeterminate() {
        assert_eq!(
            AppError::indeterminate("account", "operation timed out").outcome(),
            Outcome::Indeterminate
        );
        assert_eq!(
            AppError::downstream("account", "returned 500").outcome(),
            Outcome::Rejected
        );
        assert_eq!(AppError::NotFound("account").outcome(), Outcome::Rejected);
    }

    #[tokio::test]
    async fn downstream_failure_is_internal() {
        let (status, body) = render(AppError::downstream("account", "connection refused")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "downstream_failure");
        assert_eq!(
            body["error"]["message"],
            "account call failed: connection refused"
        );
    }
}
