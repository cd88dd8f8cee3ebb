use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common_auth::AuthError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    /// Covers both unknown email and wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not a refresh token")]
    NotRefreshToken,
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("store failure: {0}")]
    Store(StoreError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidCredentials | ServiceError::NotRefreshToken => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Auth(inner) => inner.status(),
            ServiceError::Store(_) | ServiceError::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::NotRefreshToken => "NOT_REFRESH_TOKEN",
            ServiceError::NotFound => "NOT_FOUND",
            ServiceError::Auth(inner) => inner.code(),
            ServiceError::Store(_) | ServiceError::Hashing(_) => "SERVER_ERROR",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::NotFound,
            other => ServiceError::Store(other),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = match self {
            ServiceError::Auth(inner) => return inner.into_response(),
            ServiceError::Store(ref err) => {
                error!(error = %err, "account store failure");
                "Unexpected error. Please try again later.".to_string()
            }
            ServiceError::Hashing(ref err) => {
                error!(error = %err, "password hashing failure");
                "Unexpected error. Please try again later.".to_string()
            }
            ref other => other.to_string(),
        };
        let body = ErrorResponse {
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
    fn store_not_found_becomes_not_found() {
        let err = ServiceError::from(StoreError::NotFound);
        assert!(matches!(err, ServiceError::NotFound));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_failures_are_opaque() {
        let err = ServiceError::from(StoreError::Malformed("account 7: bad role".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "SERVER_ERROR");
    }

    #[test]
    fn auth_failures_keep_their_codes() {
        let err = ServiceError::from(AuthError::PermissionDenied);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "AUTH_FORBIDDEN");
        assert_eq!(
            ServiceError::NotRefreshToken.to_string(),
            "not a refresh token"
        );
    }
}
