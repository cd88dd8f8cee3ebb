use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common_auth::Role;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;

use super::{AccountStore, StoreError, StoreResult};
use crate::model::{Account, NewAccount};

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, full_name, phone, role, birthday, created_at, updated_at";

/// Connection pool settings for the Postgres store.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    email: String,
    password_hash: String,
    full_name: String,
    phone: String,
    role: String,
    birthday: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> StoreResult<Self> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| StoreError::Malformed(format!("account {}: {err}", row.id)))?;
        Ok(Account {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            phone: row.phone,
            role,
            birthday: row.birthday,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .max_lifetime(settings.max_lifetime)
            .connect(&settings.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled migrations that have not run yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("account migrations are up to date");
        Ok(())
    }

    /// Out-of-band role change; not reachable through the service API.
    pub async fn set_role(&self, email: &str, role: Role) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET role = $1, updated_at = NOW() WHERE email = $2")
                .bind(role.as_str())
                .bind(email)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn add_user(&self, account: NewAccount) -> StoreResult<Account> {
        let insert = format!(
            "INSERT INTO accounts (email, password_hash, full_name, phone, role, birthday)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&insert)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.full_name)
            .bind(&account.phone)
            .bind(account.role.as_str())
            .bind(account.birthday)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let duplicate =
                    matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
                if duplicate {
                    StoreError::AlreadyExists
                } else {
                    StoreError::Database(err)
                }
            })?;
        Account::try_from(row)
    }

    async fn get_user(&self, email: &str) -> StoreResult<Account> {
        let select = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = sqlx::query_as::<_, AccountRow>(&select)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Account::try_from(row)
    }

    async fn get_user_list(&self, limit: i64, offset: i64) -> StoreResult<(Vec<Account>, i64)> {
        let select =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, AccountRow>(&select)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        let accounts = rows
            .into_iter()
            .map(Account::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((accounts, total))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
