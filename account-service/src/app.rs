use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{FromRef, Request, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use common_auth::{Admission, AuthError, JwtConfig, RequestGate, TokenCodec};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::handlers;
use crate::methods::{self, method_table};
use crate::metrics::AuthMetrics;
use crate::service::AccountService;
use crate::store::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub service: AccountService,
    pub gate: RequestGate,
    pub metrics: Arc<AuthMetrics>,
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        state.service.clone()
    }
}

impl FromRef<AppState> for Arc<AuthMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, jwt: JwtConfig) -> Result<Self> {
        let metrics = Arc::new(AuthMetrics::new().context("Failed to build metrics registry")?);
        let codec = Arc::new(TokenCodec::new(jwt));
        let gate = RequestGate::new(codec.clone(), method_table());
        let service = AccountService::new(store, codec, metrics.clone());
        Ok(Self {
            service,
            gate,
            metrics,
        })
    }
}

/// Runs the request gate for every operation call, keyed by request path.
pub async fn gate_requests(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.uri().path().to_string();
    let authorization = match request.headers().get(AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(value) => Some(value.to_string()),
            Err(_) => {
                state.metrics.gate_decision("unauthenticated");
                debug!(method = %method, "authorization header is not valid text");
                return AuthError::InvalidToken.into_response();
            }
        },
        None => None,
    };

    match state.gate.admit(&method, authorization.as_deref()) {
        Ok(Admission::Public) => state.metrics.gate_decision("public"),
        Ok(Admission::Identified(identity)) => {
            state.metrics.gate_decision("admitted");
            request.extensions_mut().insert(identity);
        }
        Err(err) => {
            let outcome = match err {
                AuthError::PermissionDenied => "denied",
                _ => "unauthenticated",
            };
            state.metrics.gate_decision(outcome);
            debug!(method = %method, reason = %err, "request rejected by gate");
            return err.into_response();
        }
    }

    next.run(request).await
}

/// Operation routes sit behind the gate; `/healthz` and `/metrics` do not.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(methods::REGISTER, post(handlers::register))
        .route(methods::TOKEN, post(handlers::token))
        .route(methods::REFRESH, post(handlers::refresh))
        .route(methods::VERIFY, post(handlers::verify))
        .route(methods::PROFILE, post(handlers::profile))
        .route(methods::LIST_USERS, post(handlers::list_users))
        .route(methods::DELETE_USER, post(handlers::delete_user))
        // unknown operations are gated too, then rejected
        .fallback(handlers::unknown_operation)
        .layer(middleware::from_fn_with_state(state.clone(), gate_requests))
        .route("/healthz", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

pub fn build_app(state: AppState, config: &ServiceConfig) -> Result<Router> {
    let cors = cors_layer(&config.allowed_origins)?;
    Ok(router(state)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http()))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]))
}
