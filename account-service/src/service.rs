use std::sync::Arc;

use common_auth::{AuthContext, AuthError, IssuedPair, Role, TokenCodec};
use tracing::{debug, error, info, warn};

use crate::dto::{
    DeleteUserResponse, ListUsersResponse, RegisterRequest, RegisterResponse, TokenResponse,
    UserItem, VerifyResponse,
};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::AuthMetrics;
use crate::model::{parse_birthday, NewAccount};
use crate::password::{hash_password, verify_against_decoy, verify_password};
use crate::store::{AccountStore, StoreError};

const TOKEN_TYPE: &str = "Bearer";

/// Account operations behind the request gate.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    codec: Arc<TokenCodec>,
    metrics: Arc<AuthMetrics>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        codec: Arc<TokenCodec>,
        metrics: Arc<AuthMetrics>,
    ) -> Self {
        Self {
            store,
            codec,
            metrics,
        }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// A taken email is reported in the response, not as an error.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<RegisterResponse> {
        let email = request.email.trim().to_string();
        if email.is_empty() || request.password.is_empty() {
            return Err(ServiceError::validation("email and password are required"));
        }
        let birthday = parse_birthday(&request.birthday)
            .map_err(|_| ServiceError::validation("birthday must use the YYYY-MM-DD format"))?;

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|err| ServiceError::Hashing(err.to_string()))?
            .map_err(|err| ServiceError::Hashing(err.to_string()))?;

        let mut account = NewAccount::new(email.clone(), password_hash);
        account.full_name = request.full_name.trim().to_string();
        account.phone = request.phone.trim().to_string();
        account.birthday = birthday;

        match self.store.add_user(account).await {
            Ok(created) => {
                info!(account_id = created.id, email = %created.email, "account registered");
                Ok(RegisterResponse {
                    ok: true,
                    message: "created".to_string(),
                })
            }
            Err(StoreError::AlreadyExists) => {
                debug!(email = %email, "registration for existing email");
                Ok(RegisterResponse {
                    ok: false,
                    message: "user exists".to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn token(&self, email: &str, password: &str) -> ServiceResult<TokenResponse> {
        let email = email.trim();
        let account = match self.store.get_user(email).await {
            Ok(account) => Some(account),
            Err(StoreError::NotFound) => None,
            Err(err) => {
                self.metrics.login_attempt("error");
                return Err(err.into());
            }
        };

        let password = password.to_string();
        let stored_hash = account.as_ref().map(|account| account.password_hash.clone());
        let matched = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => verify_password(&password, &hash),
            None => verify_against_decoy(&password),
        })
        .await
        .map_err(|err| ServiceError::Hashing(err.to_string()))?;

        let account = match account {
            Some(account) if matched => account,
            _ => {
                self.metrics.login_attempt("invalid_credentials");
                warn!(email = %email, "login rejected");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let pair = self.issue_pair(&account.email, account.role)?;
        self.metrics.login_attempt("success");
        info!(account_id = account.id, email = %account.email, "login succeeded");
        Ok(token_response(pair))
    }

    /// Previously issued refresh tokens stay usable until they expire.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenResponse> {
        let claims = self.codec.verify(refresh_token)?;
        if !claims.is_refresh() {
            debug!(subject = %claims.subject, kind = %claims.kind, "refresh with wrong token kind");
            return Err(ServiceError::NotRefreshToken);
        }

        let pair = self.issue_pair(&claims.subject, claims.role)?;
        info!(email = %claims.subject, "token pair refreshed");
        Ok(token_response(pair))
    }

    pub fn verify(&self, access_token: &str) -> VerifyResponse {
        match self.codec.verify(access_token) {
            Ok(claims) if claims.is_access() => VerifyResponse {
                valid: true,
                email: Some(claims.subject),
                exp: Some(claims.expires_at.timestamp()),
            },
            Ok(claims) => {
                debug!(kind = %claims.kind, "verify called with non-access token");
                VerifyResponse::invalid()
            }
            Err(_) => VerifyResponse::invalid(),
        }
    }

    pub async fn profile(&self, caller: &AuthContext) -> ServiceResult<UserItem> {
        let account = self.store.get_user(&caller.subject).await?;
        Ok(UserItem::from(&account))
    }

    pub async fn list_users(
        &self,
        page_number: i64,
        page_size: i64,
    ) -> ServiceResult<ListUsersResponse> {
        if page_number <= 0 || page_size <= 0 {
            return Err(ServiceError::validation(
                "page_number and page_size must be positive",
            ));
        }
        let offset = (page_number - 1)
            .checked_mul(page_size)
            .ok_or_else(|| ServiceError::validation("page_number is out of range"))?;

        let (accounts, total_count) = self.store.get_user_list(page_size, offset).await?;
        let total_pages =
            (total_count / page_size + i64::from(total_count % page_size != 0)).max(1);

        Ok(ListUsersResponse {
            items: accounts.iter().map(UserItem::from).collect(),
            total_count,
            total_pages,
            page_number,
        })
    }

    /// Store failures come back as `success: false`.
    pub async fn delete_user(&self, id: i64) -> DeleteUserResponse {
        match self.store.delete_user(id).await {
            Ok(()) => {
                info!(account_id = id, "account removed");
                DeleteUserResponse {
                    success: true,
                    message: "removed".to_string(),
                }
            }
            Err(StoreError::NotFound) => DeleteUserResponse {
                success: false,
                message: "account not found".to_string(),
            },
            Err(err) => {
                error!(account_id = id, error = %err, "failed to remove account");
                DeleteUserResponse {
                    success: false,
                    message: "unable to remove account".to_string(),
                }
            }
        }
    }

    fn issue_pair(&self, subject: &str, role: Role) -> Result<IssuedPair, AuthError> {
        let pair = self.codec.issue_pair(subject, role)?;
        self.metrics.token_issued(pair.access.claims.kind.as_str());
        self.metrics.token_issued(pair.refresh.claims.kind.as_str());
        Ok(pair)
    }
}

fn token_response(pair: IssuedPair) -> TokenResponse {
    let expires_in = pair.expires_in(pair.access.claims.issued_at);
    TokenResponse {
        access_token: pair.access.token,
        refresh_token: pair.refresh.token,
        expires_in,
        token_type: TOKEN_TYPE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAccountStore;
    use common_auth::{JwtConfig, TokenKind};

    fn service() -> AccountService {
        let codec = Arc::new(TokenCodec::new(JwtConfig::new("service-secret")));
        let metrics = Arc::new(AuthMetrics::new().expect("metrics"));
        AccountService::new(Arc::new(InMemoryAccountStore::new()), codec, metrics)
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name: String::new(),
            phone: String::new(),
            birthday: String::new(),
        }
    }

    #[tokio::test]
    async fn token_response_carries_full_access_lifetime() {
        let service = service();
        service
            .register(register_request("a@x.com", "pw1"))
            .await
            .expect("register");

        let tokens = service.token("a@x.com", "pw1").await.expect("token");
        assert_eq!(tokens.expires_in, 900);
        assert_eq!(tokens.token_type, "Bearer");
        let access = service.codec().verify(&tokens.access_token).expect("access");
        assert_eq!(access.kind, TokenKind::Access);
        let refresh = service.codec().verify(&tokens.refresh_token).expect("refresh");
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn verify_rejects_refresh_tokens() {
        let service = service();
        let refresh = service
            .codec()
            .issue("a@x.com", Role::User, TokenKind::Refresh)
            .expect("sign");
        assert_eq!(service.verify(&refresh.token), VerifyResponse::invalid());
        assert_eq!(service.verify("garbage"), VerifyResponse::invalid());
    }

    #[tokio::test]
    async fn list_users_rejects_non_positive_paging() {
        let service = service();
        for (page, size) in [(0, 10), (1, 0), (-1, 5)] {
            let err = service.list_users(page, size).await.expect_err("invalid paging");
            assert!(matches!(err, ServiceError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn largest_page_size_counts_a_single_page() {
        let service = service();
        service
            .register(register_request("a@x.com", "pw1"))
            .await
            .expect("register");

        let listing = service.list_users(1, i64::MAX).await.expect("list");
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.total_count, 1);
        assert_eq!(listing.total_pages, 1);
    }

    #[tokio::test]
    async fn empty_store_still_reports_one_page() {
        let listing = service().list_users(1, 10).await.expect("list");
        assert!(listing.items.is_empty());
        assert_eq!(listing.total_count, 0);
        assert_eq!(listing.total_pages, 1);
    }

    #[tokio::test]
    async fn profile_of_removed_account_is_not_found() {
        let service = service();
        let caller = AuthContext::from(
            service
                .codec()
                .verify(
                    &service
                        .codec()
                        .issue("ghost@x.com", Role::User, TokenKind::Access)
                        .expect("sign")
                        .token,
                )
                .expect("verify"),
        );
        let err = service.profile(&caller).await.expect_err("missing");
        assert!(matches!(err, ServiceError::NotFound));
    }
}
