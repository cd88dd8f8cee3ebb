use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::codec::TokenCodec;
use crate::error::{AuthError, AuthResult};
use crate::extractors::{parse_bearer, AuthContext};

/// How the gate treats an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    AdminOnly,
}

/// Read-only classification of every exposed operation.
///
/// Operations missing from the table are treated as `Authenticated`.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: HashMap<String, Access>,
}

impl MethodTable {
    pub fn builder() -> MethodTableBuilder {
        MethodTableBuilder::default()
    }

    pub fn classify(&self, method: &str) -> Access {
        self.entries
            .get(method)
            .copied()
            .unwrap_or(Access::Authenticated)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct MethodTableBuilder {
    entries: HashMap<String, Access>,
}

impl MethodTableBuilder {
    pub fn public(self, method: impl Into<String>) -> Self {
        self.with(method, Access::Public)
    }

    pub fn authenticated(self, method: impl Into<String>) -> Self {
        self.with(method, Access::Authenticated)
    }

    pub fn admin_only(self, method: impl Into<String>) -> Self {
        self.with(method, Access::AdminOnly)
    }

    pub fn with(mut self, method: impl Into<String>, access: Access) -> Self {
        self.entries.insert(method.into(), access);
        self
    }

    pub fn build(self) -> MethodTable {
        MethodTable {
            entries: self.entries,
        }
    }
}

/// Outcome of a call that made it through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Public operation; no identity is attached.
    Public,
    /// Verified caller identity to hand to the business layer.
    Identified(AuthContext),
}

impl Admission {
    pub fn identity(&self) -> Option<&AuthContext> {
        match self {
            Admission::Public => None,
            Admission::Identified(identity) => Some(identity),
        }
    }
}

/// Classifies, authenticates and authorizes every inbound call.
#[derive(Clone)]
pub struct RequestGate {
    codec: Arc<TokenCodec>,
    table: Arc<MethodTable>,
}

impl RequestGate {
    pub fn new(codec: Arc<TokenCodec>, table: MethodTable) -> Self {
        Self {
            codec,
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &MethodTable {
        &self.table
    }

    pub fn admit(&self, method: &str, authorization: Option<&str>) -> AuthResult<Admission> {
        self.admit_at(method, authorization, Utc::now())
    }

    /// Any structurally valid, unexpired token is accepted here regardless of
    /// its kind; kind-specific checks belong to the operation itself.
    pub fn admit_at(
        &self,
        method: &str,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<Admission> {
        let access = self.table.classify(method);
        if access == Access::Public {
            return Ok(Admission::Public);
        }

        let token = authorization
            .and_then(parse_bearer)
            .ok_or(AuthError::MissingAuthorization)?;

        let claims = self.codec.verify_at(token, now)?;

        if access == Access::AdminOnly && !claims.role.is_admin() {
            warn!(
                method,
                subject = %claims.subject,
                role = %claims.role,
                "admin-only operation denied"
            );
            return Err(AuthError::PermissionDenied);
        }

        Ok(Admission::Identified(AuthContext::from(claims)))
    }
}
