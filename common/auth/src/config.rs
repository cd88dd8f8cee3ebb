use std::fmt;

use crate::claims::TokenKind;

pub const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_LEEWAY_SECONDS: u32 = 5;
/// Upper bound accepted for either token lifetime (100 years).
pub const MAX_TTL_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// Runtime configuration for signing and verifying tokens.
///
/// Built once at startup and shared read-only by the codec and the gate.
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: Vec<u8>,
    /// Lifetime of access tokens in seconds.
    pub access_ttl_seconds: i64,
    /// Lifetime of refresh tokens in seconds.
    pub refresh_ttl_seconds: i64,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl JwtConfig {
    /// Construct config with the default lifetimes (15 minutes / 7 days) and a 5 second leeway.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            leeway_seconds: DEFAULT_LEEWAY_SECONDS,
        }
    }

    pub fn with_access_ttl(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    pub fn with_refresh_ttl(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_ttl_seconds,
            TokenKind::Refresh => self.refresh_ttl_seconds,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_lifetimes() {
        let config = JwtConfig::new("secret");
        assert_eq!(config.ttl_for(TokenKind::Access), 900);
        assert_eq!(config.ttl_for(TokenKind::Refresh), 604_800);
        assert_eq!(config.leeway_seconds, 5);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = JwtConfig::new("top-secret-value");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
