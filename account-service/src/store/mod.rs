//! Account persistence behind a small async contract.
//!
//! The core only relies on four operations. Email uniqueness must be enforced
//! atomically by the implementation, including under concurrent registration.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Account, NewAccount};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountStore;
pub use postgres::{DatabaseSettings, PgAccountStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists")]
    AlreadyExists,
    #[error("not found")]
    NotFound,
    #[error("stored account is malformed: {0}")]
    Malformed(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account; `AlreadyExists` when the email is taken.
    async fn add_user(&self, account: NewAccount) -> StoreResult<Account>;

    async fn get_user(&self, email: &str) -> StoreResult<Account>;

    /// One page of accounts ordered by id, plus the total number of accounts.
    async fn get_user_list(&self, limit: i64, offset: i64) -> StoreResult<(Vec<Account>, i64)>;

    async fn delete_user(&self, id: i64) -> StoreResult<()>;
}
