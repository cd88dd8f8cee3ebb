use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};

use crate::claims::{Claims, TokenKind};
use crate::error::AuthError;
use crate::roles::Role;

/// Identity the request gate attaches to every admitted, non-public call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub subject: String,
    pub role: Role,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.subject,
            role: claims.role,
            kind: claims.kind,
            expires_at: claims.expires_at,
        }
    }
}

/// Reads the identity placed in request extensions by the gate.
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingAuthorization)
    }
}

/// Pull the token out of an `authorization` value.
///
/// The `Bearer ` prefix is stripped when present; otherwise the raw value is
/// used as-is. Blank values count as absent.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let raw = value.trim_start();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
