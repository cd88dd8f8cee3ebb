use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::claims::{Claims, ClaimsRepr, TokenKind};
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at
    }
}

/// Access and refresh token signed for the same subject in one step.
#[derive(Debug, Clone)]
pub struct IssuedPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

impl IssuedPair {
    /// Remaining lifetime of the access token in whole seconds.
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.access.expires_at() - now).num_seconds().max(0)
    }
}

/// Signs and verifies HS256 tokens with the process-wide secret.
///
/// Holds no mutable state, so one instance is shared across every request.
#[derive(Clone)]
pub struct TokenCodec {
    config: JwtConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: JwtConfig) -> Self {
        let encoding = EncodingKey::from_secret(&config.secret);
        let decoding = DecodingKey::from_secret(&config.secret);

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked in verify_at against the caller's clock and our leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            config,
            encoding,
            decoding,
            validation,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn issue(&self, subject: &str, role: Role, kind: TokenKind) -> AuthResult<IssuedToken> {
        self.issue_at(subject, role, kind, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        role: Role,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let ttl_seconds = self.config.ttl_for(kind);
        let claims = Claims::new(subject, role, kind, now, ttl_seconds).ok_or_else(|| {
            AuthError::Signing(format!("{kind} token lifetime of {ttl_seconds}s is out of range"))
        })?;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims.to_repr(),
            &self.encoding,
        )
        .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    pub fn issue_pair(&self, subject: &str, role: Role) -> AuthResult<IssuedPair> {
        self.issue_pair_at(subject, role, Utc::now())
    }

    /// Both tokens are signed before anything is returned, so a failure never
    /// leaves the caller holding half a pair.
    pub fn issue_pair_at(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedPair> {
        let access = self.issue_at(subject, role, TokenKind::Access, now)?;
        let refresh = self.issue_at(subject, role, TokenKind::Refresh, now)?;
        Ok(IssuedPair { access, refresh })
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature and structure, then expiry with the configured leeway.
    ///
    /// Does not look at the token kind; callers that care must check it.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let token_data =
            decode::<ClaimsRepr>(token, &self.decoding, &self.validation).map_err(|err| {
                debug!(error = %err, "token failed signature or structure check");
                AuthError::InvalidToken
            })?;

        let claims = Claims::try_from(token_data.claims).map_err(|err| {
            debug!(error = %err, "token carried malformed claims");
            AuthError::InvalidToken
        })?;

        if claims.has_expired_at(now, self.config.leeway_seconds) {
            debug!(
                kind = %claims.kind,
                expires_at = %claims.expires_at,
                "token expired beyond leeway"
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
