#![allow(dead_code)]

use std::sync::Arc;

use account_service::model::{Account, NewAccount};
use account_service::password::hash_password;
use account_service::store::{AccountStore, InMemoryAccountStore};
use account_service::{router, AppState};
use anyhow::{anyhow, Context, Result};
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common_auth::{JwtConfig, Role, TokenCodec};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "account-service-test-secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

/// Router wired to an in-memory store, plus a codec sharing its secret.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn AccountStore>,
    pub codec: TokenCodec,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_store(Arc::new(InMemoryAccountStore::new()))
    }

    pub fn with_store(store: Arc<dyn AccountStore>) -> Result<Self> {
        let state = AppState::new(store.clone(), test_jwt_config())?;
        Ok(Self {
            router: router(state),
            store,
            codec: TokenCodec::new(test_jwt_config()),
        })
    }

    /// Admin accounts can only be created out-of-band, so tests go straight to the store.
    pub async fn seed_account(&self, email: &str, password: &str, role: Role) -> Result<Account> {
        let hash = hash_password(password).map_err(|err| anyhow!("hash password: {err}"))?;
        let mut account = NewAccount::new(email, hash);
        account.role = role;
        self.store
            .add_user(account)
            .await
            .context("seed account")
    }

    pub async fn seed_admin(&self) -> Result<Account> {
        self.seed_account(ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin)
            .await
    }

    pub async fn call(
        &self,
        method: &str,
        body: Value,
        authorization: Option<&str>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(method)
            .header(CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let request = builder.body(Body::from(serde_json::to_vec(&body)?))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("response body is not JSON: {bytes:?}"))?
        };
        Ok((status, json))
    }

    pub async fn call_as(&self, method: &str, body: Value, token: &str) -> Result<(StatusCode, Value)> {
        self.call(method, body, Some(&format!("Bearer {token}"))).await
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, String)> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, String::from_utf8(bytes.to_vec())?))
    }

    /// Log in and return the access and refresh tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, String)> {
        let (status, body) = self
            .call(
                "/oauth.OAuth/Token",
                serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await?;
        if status != StatusCode::OK {
            return Err(anyhow!("login for {email} failed with {status}: {body}"));
        }
        Ok((string_field(&body, "access_token")?, string_field(&body, "refresh_token")?))
    }
}

pub fn string_field(body: &Value, field: &str) -> Result<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("missing string field {field} in {body}"))
}
