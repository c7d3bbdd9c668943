use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ApiResponse;
use service::auth::errors::AuthError;
use service::auth::session::SessionError;
use service::patient::errors::PatientError;
use thiserror::Error;
use tracing::{error, warn};

const INTERNAL_MESSAGE: &str = "internal server error";

/// Every failed request is rendered as the JSON envelope with a status and a
/// caller-safe message. Internal details are logged here and never returned.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "internal failure");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::failure(self.status.as_u16(), self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected request body");
        Self::bad_request("validation failed")
    }
}

impl From<AuthError> for JsonApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::DuplicateAccount => Self::new(StatusCode::CONFLICT, err.to_string()),
            AuthError::InvalidCredentials => Self::unauthorized(err.to_string()),
            other => Self::internal(format_args!("auth [{}]: {}", other.code(), other)),
        }
    }
}

impl From<PatientError> for JsonApiError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::Validation(msg) => Self::bad_request(msg),
            PatientError::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            PatientError::UpstreamUnavailable(ref detail) => {
                warn!(error = %detail, "patient registry unavailable");
                Self::new(StatusCode::BAD_GATEWAY, "patient registry unavailable")
            }
            PatientError::Conflict(_) => Self::new(StatusCode::CONFLICT, "patient already exists"),
            other => Self::internal(format_args!("patient [{}]: {}", other.code(), other)),
        }
    }
}

impl From<SessionError> for JsonApiError {
    fn from(err: SessionError) -> Self {
        warn!(code = err.code(), error = %err, "session rejected");
        Self::unauthorized("invalid or expired token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_auth_errors() {
        assert_eq!(JsonApiError::from(AuthError::Validation("x".into())).status, StatusCode::BAD_REQUEST);
        assert_eq!(JsonApiError::from(AuthError::DuplicateAccount).status, StatusCode::CONFLICT);
        assert_eq!(JsonApiError::from(AuthError::InvalidCredentials).status, StatusCode::UNAUTHORIZED);

        let internal = JsonApiError::from(AuthError::Repository("connection reset by peer".into()));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.message.contains("connection reset"));
    }

    #[test]
    fn maps_patient_errors() {
        assert_eq!(JsonApiError::from(PatientError::NotFound).status, StatusCode::NOT_FOUND);
        let upstream = JsonApiError::from(PatientError::UpstreamUnavailable("dns failure for 10.0.0.3".into()));
        assert_eq!(upstream.status, StatusCode::BAD_GATEWAY);
        assert!(!upstream.message.contains("10.0.0.3"));
        assert_eq!(
            JsonApiError::from(PatientError::Repository("pool timed out".into())).message,
            INTERNAL_MESSAGE
        );
    }

    #[test]
    fn session_errors_share_one_message() {
        let a = JsonApiError::from(SessionError::Expired);
        let b = JsonApiError::from(SessionError::InvalidSignature);
        assert_eq!(a.status, StatusCode::UNAUTHORIZED);
        assert_eq!(a.message, b.message);
    }
}
