use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles::Role;

/// Which half of a credential pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-focused representation of verified token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub subject: String,
    pub role: Role,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Build a fresh claims set; timestamps are truncated to whole seconds.
    ///
    /// `None` when the expiry falls outside the representable time range.
    pub(crate) fn new(
        subject: impl Into<String>,
        role: Role,
        kind: TokenKind,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Option<Self> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = Duration::try_seconds(ttl_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))?;
        Some(Self {
            subject: subject.into(),
            role,
            kind,
            issued_at,
            expires_at,
        })
    }

    pub fn is_access(&self) -> bool {
        self.kind == TokenKind::Access
    }

    pub fn is_refresh(&self) -> bool {
        self.kind == TokenKind::Refresh
    }

    /// True once `now` is past the expiry by more than `leeway_seconds`.
    pub fn has_expired_at(&self, now: DateTime<Utc>, leeway_seconds: u32) -> bool {
        // an expiry pushed past the end of time by the leeway never lapses
        match self
            .expires_at
            .checked_add_signed(Duration::seconds(i64::from(leeway_seconds)))
        {
            Some(deadline) => now > deadline,
            None => false,
        }
    }

    pub(crate) fn to_repr(&self) -> ClaimsRepr {
        ClaimsRepr {
            sub: self.subject.clone(),
            role: self.role.as_str().to_string(),
            typ: self.kind,
            iat: self.issued_at.timestamp(),
            exp: self.expires_at.timestamp(),
        }
    }
}

/// Wire shape of the token payload.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ClaimsRepr {
    pub sub: String,
    pub role: String,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ClaimError {
    #[error("invalid claim '{0}' with value '{1}'")]
    Invalid(&'static str, String),
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = ClaimError;

    fn try_from(value: ClaimsRepr) -> Result<Self, Self::Error> {
        if value.sub.trim().is_empty() {
            return Err(ClaimError::Invalid("sub", value.sub));
        }

        let role = value
            .role
            .parse::<Role>()
            .map_err(|_| ClaimError::Invalid("role", value.role.clone()))?;

        let issued_at = Utc
            .timestamp_opt(value.iat, 0)
            .single()
            .ok_or_else(|| ClaimError::Invalid("iat", value.iat.to_string()))?;
        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| ClaimError::Invalid("exp", value.exp.to_string()))?;

        if expires_at <= issued_at {
            return Err(ClaimError::Invalid("exp", value.exp.to_string()));
        }

        Ok(Self {
            subject: value.sub,
            role,
            kind: value.typ,
            issued_at,
            expires_at,
        })
    }
}
