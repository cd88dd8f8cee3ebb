use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Failures surfaced by the codec and the request gate.
///
/// `InvalidToken` deliberately covers every verification failure (bad
/// signature, malformed payload, expiry) so callers cannot tell them apart.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingAuthorization,
    #[error("invalid token")]
    InvalidToken,
    #[error("admin role required")]
    PermissionDenied,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "AUTH_HEADER",
            AuthError::InvalidToken => "AUTH_TOKEN",
            AuthError::PermissionDenied => "AUTH_FORBIDDEN",
            AuthError::Signing(_) => "SERVER_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::Signing(_) => "Unable to issue authentication tokens.".to_string(),
            other => other.to_string(),
        };
        let body = ErrorBody {
            code: self.code(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_and_forbidden_are_distinct() {
        assert_eq!(
            AuthError::MissingAuthorization.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::PermissionDenied.status(), StatusCode::FORBIDDEN);
        assert_ne!(
            AuthError::InvalidToken.code(),
            AuthError::PermissionDenied.code()
        );
    }

    #[test]
    fn signing_failure_hides_detail() {
        let response = AuthError::Signing("key material exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
