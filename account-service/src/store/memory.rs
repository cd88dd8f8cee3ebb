use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AccountStore, StoreError, StoreResult};
use crate::model::{Account, NewAccount};

/// Process-local store used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    accounts: BTreeMap<i64, Account>,
    ids_by_email: HashMap<String, i64>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn add_user(&self, account: NewAccount) -> StoreResult<Account> {
        // check and insert under one write guard
        let mut guard = self.inner.write().await;
        if guard.ids_by_email.contains_key(&account.email) {
            return Err(StoreError::AlreadyExists);
        }

        guard.last_id += 1;
        let id = guard.last_id;
        let now = Utc::now();
        let stored = Account {
            id,
            email: account.email,
            password_hash: account.password_hash,
            full_name: account.full_name,
            phone: account.phone,
            role: account.role,
            birthday: account.birthday,
            created_at: now,
            updated_at: now,
        };

        guard.ids_by_email.insert(stored.email.clone(), id);
        guard.accounts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, email: &str) -> StoreResult<Account> {
        let guard = self.inner.read().await;
        guard
            .ids_by_email
            .get(email)
            .and_then(|id| guard.accounts.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_list(&self, limit: i64, offset: i64) -> StoreResult<(Vec<Account>, i64)> {
        let guard = self.inner.read().await;
        let total = guard.accounts.len() as i64;
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let page = guard
            .accounts
            .values()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        let removed = guard.accounts.remove(&id).ok_or(StoreError::NotFound)?;
        guard.ids_by_email.remove(&removed.email);
        Ok(())
    }
}
