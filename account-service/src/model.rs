use chrono::{DateTime, NaiveDate, Utc};
use common_auth::Role;

/// Layout used for birthdays on the wire.
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Persisted account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub role: Role,
    pub birthday: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account data handed to the store on registration; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub role: Role,
    pub birthday: Option<NaiveDate>,
}

impl NewAccount {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            full_name: String::new(),
            phone: String::new(),
            role: Role::default(),
            birthday: None,
        }
    }
}

/// Empty input means "not provided"; anything else must be `YYYY-MM-DD`.
pub fn parse_birthday(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_LAYOUT).map(Some)
}
