use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common_auth::AuthContext;
use serde_json::json;
use tracing::{error, info};

use crate::dto::{
    DeleteUserRequest, DeleteUserResponse, ListUsersRequest, ListUsersResponse, RefreshRequest,
    RegisterRequest, RegisterResponse, TokenRequest, TokenResponse, UserItem, VerifyRequest,
    VerifyResponse,
};
use crate::error::ServiceResult;
use crate::metrics::AuthMetrics;
use crate::service::AccountService;

pub async fn register(
    State(service): State<AccountService>,
    Json(request): Json<RegisterRequest>,
) -> ServiceResult<Json<RegisterResponse>> {
    service.register(request).await.map(Json)
}

pub async fn token(
    State(service): State<AccountService>,
    Json(request): Json<TokenRequest>,
) -> ServiceResult<Json<TokenResponse>> {
    service
        .token(&request.email, &request.password)
        .await
        .map(Json)
}

pub async fn refresh(
    State(service): State<AccountService>,
    Json(request): Json<RefreshRequest>,
) -> ServiceResult<Json<TokenResponse>> {
    service.refresh(&request.refresh_token).await.map(Json)
}

pub async fn verify(
    State(service): State<AccountService>,
    Json(request): Json<VerifyRequest>,
) -> Json<VerifyResponse> {
    Json(service.verify(&request.access_token))
}

pub async fn profile(
    State(service): State<AccountService>,
    caller: AuthContext,
) -> ServiceResult<Json<UserItem>> {
    service.profile(&caller).await.map(Json)
}

pub async fn list_users(
    State(service): State<AccountService>,
    Json(request): Json<ListUsersRequest>,
) -> ServiceResult<Json<ListUsersResponse>> {
    service
        .list_users(request.page_number, request.page_size)
        .await
        .map(Json)
}

pub async fn delete_user(
    State(service): State<AccountService>,
    caller: AuthContext,
    Json(request): Json<DeleteUserRequest>,
) -> Json<DeleteUserResponse> {
    info!(admin = %caller.subject, account_id = request.id, "account removal requested");
    Json(service.delete_user(request.id).await)
}

pub async fn unknown_operation() -> Response {
    let body = json!({ "code": "NOT_FOUND", "message": "unknown operation" });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics(State(metrics): State<Arc<AuthMetrics>>) -> Response {
    match metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
