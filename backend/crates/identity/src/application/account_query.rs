//! Account Query Use Case
//!
//! Read-only lookups: by id, by email, and the paginated admin listing.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};
use kernel::id::AccountId;

/// Paginated listing output
pub struct AccountPage {
    pub items: Vec<Account>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Account query use case
pub struct AccountQueryUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> AccountQueryUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn by_id(&self, account_id: &AccountId) -> IdentityResult<Account> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }

    pub async fn by_email(&self, email: &str) -> IdentityResult<Account> {
        let email = Email::new(email)?;
        self.repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }

    /// Accounts newest-first. Page numbers start at 1; the page size is
    /// clamped to the configured cap.
    pub async fn list(&self, page: u32, page_size: u32) -> IdentityResult<AccountPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, self.config.max_page_size);

        let (items, total) = self.repo.list(page, page_size).await?;

        Ok(AccountPage {
            items,
            total,
            page,
            page_size,
        })
    }
}
