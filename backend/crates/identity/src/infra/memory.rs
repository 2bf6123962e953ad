//! In-Memory Store Implementations
//!
//! Process-local adapters. `InMemoryPendingChangeStore` is the reference
//! backing for pending email changes, which do not outlive the process;
//! `InMemoryAccountRepository` backs the use-case tests and development
//! wiring. Each keeps its whole state under one mutex, so read-check and
//! write commit atomically - the same duplicate-email guarantee the
//! Postgres unique index provides.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::domain::entity::{account::Account, pending_email_change::PendingEmailChange};
use crate::domain::repository::{AccountRepository, PendingChangeStore};
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};
use kernel::id::AccountId;

/// In-memory account repository
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> IdentityResult<std::sync::MutexGuard<'_, HashMap<Uuid, Account>>> {
        self.accounts
            .lock()
            .map_err(|_| IdentityError::Internal("Account store lock poisoned".to_string()))
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &Account) -> IdentityResult<()> {
        let mut accounts = self.lock()?;

        // Uniqueness check and insert happen under the same lock
        if accounts.values().any(|a| a.email == account.email) {
            return Err(IdentityError::EmailTaken);
        }

        accounts.insert(account.id.into_uuid(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> IdentityResult<Option<Account>> {
        Ok(self.lock()?.get(id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>> {
        Ok(self
            .lock()?
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn update(&self, account: &Account) -> IdentityResult<()> {
        let mut accounts = self.lock()?;

        if !accounts.contains_key(account.id.as_uuid()) {
            return Err(IdentityError::AccountNotFound);
        }

        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(IdentityError::EmailTaken);
        }

        accounts.insert(account.id.into_uuid(), account.clone());
        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> IdentityResult<()> {
        self.lock()?
            .remove(id.as_uuid())
            .map(|_| ())
            .ok_or(IdentityError::AccountNotFound)
    }

    async fn list(&self, page: u32, page_size: u32) -> IdentityResult<(Vec<Account>, u64)> {
        let accounts = self.lock()?;
        let total = accounts.len() as u64;

        let mut items: Vec<Account> = accounts.values().cloned().collect();
        items.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));

        let offset = (page.saturating_sub(1) as usize) * page_size as usize;
        let items = items
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        Ok((items, total))
    }
}

/// In-memory pending email change store (one entry per account)
#[derive(Default)]
pub struct InMemoryPendingChangeStore {
    changes: Mutex<HashMap<Uuid, PendingEmailChange>>,
}

impl InMemoryPendingChangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> IdentityResult<std::sync::MutexGuard<'_, HashMap<Uuid, PendingEmailChange>>> {
        self.changes
            .lock()
            .map_err(|_| IdentityError::Internal("Pending change store lock poisoned".to_string()))
    }
}

impl PendingChangeStore for InMemoryPendingChangeStore {
    async fn put(&self, change: &PendingEmailChange) -> IdentityResult<()> {
        // Last writer wins: a retry invalidates the earlier request
        self.lock()?
            .insert(change.account_id.into_uuid(), change.clone());
        Ok(())
    }

    async fn get(&self, account_id: &AccountId) -> IdentityResult<Option<PendingEmailChange>> {
        Ok(self.lock()?.get(account_id.as_uuid()).cloned())
    }

    async fn remove(&self, account_id: &AccountId) -> IdentityResult<()> {
        self.lock()?.remove(account_id.as_uuid());
        Ok(())
    }
}
