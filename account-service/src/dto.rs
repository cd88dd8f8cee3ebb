use serde::{Deserialize, Serialize};

use crate::model::{Account, DATE_LAYOUT};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub birthday: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyRequest {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl VerifyResponse {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            email: None,
            exp: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListUsersRequest {
    pub page_number: i64,
    pub page_size: i64,
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserItem {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: String,
    pub birthday: Option<String>,
    pub created: String,
}

impl From<&Account> for UserItem {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            phone: account.phone.clone(),
            role: account.role.as_str().to_string(),
            birthday: account
                .birthday
                .map(|date| date.format(DATE_LAYOUT).to_string()),
            created: account.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListUsersResponse {
    pub items: Vec<UserItem>,
    pub total_count: i64,
    pub total_pages: i64,
    pub page_number: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteUserRequest {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
    pub message: String,
}
