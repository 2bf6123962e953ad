//! Email Change Use Case
//!
//! Two-phase email change: request a code for the candidate address,
//! then confirm with that code. The pending record lives in an injected
//! keyed store, one entry per account, last writer wins.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::entity::{account::Account, pending_email_change::PendingEmailChange};
use crate::domain::repository::{AccountRepository, ChangeCodeNotifier, PendingChangeStore};
use crate::domain::services::generate_change_code;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};
use kernel::id::AccountId;

/// Email change use case
pub struct EmailChangeUseCase<R, P, N>
where
    R: AccountRepository,
    P: PendingChangeStore,
    N: ChangeCodeNotifier,
{
    repo: Arc<R>,
    pending: Arc<P>,
    notifier: Arc<N>,
    config: Arc<IdentityConfig>,
}

impl<R, P, N> EmailChangeUseCase<R, P, N>
where
    R: AccountRepository,
    P: PendingChangeStore,
    N: ChangeCodeNotifier,
{
    pub fn new(repo: Arc<R>, pending: Arc<P>, notifier: Arc<N>, config: Arc<IdentityConfig>) -> Self {
        Self {
            repo,
            pending,
            notifier,
            config,
        }
    }

    /// Start an email change: store a pending record and send its code
    /// to the candidate address.
    pub async fn request(&self, account_id: &AccountId, new_email: String) -> IdentityResult<()> {
        let account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        let new_email = Email::new(new_email)?;

        // Emails are lowercased on construction, so this equality is the
        // case-insensitive comparison.
        if new_email == account.email {
            return Err(IdentityError::SameEmail);
        }

        if self.repo.find_by_email(&new_email).await?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        let code = generate_change_code();
        let change = PendingEmailChange::new(
            account.id,
            new_email.clone(),
            code.clone(),
            self.config.change_code_ttl_ms(),
        );

        // Replaces any prior pending change for this account
        self.pending.put(&change).await?;

        // A code that was never delivered must not linger
        if let Err(e) = self.notifier.send_code(&new_email, &code).await {
            self.pending.remove(account_id).await?;
            return Err(e);
        }

        tracing::info!(
            account_id = %account.id,
            "Email change requested"
        );

        Ok(())
    }

    /// Confirm a pending change: on success the account carries the new
    /// address, unverified, with the role-reset policy applied.
    pub async fn confirm(
        &self,
        account_id: &AccountId,
        new_email: String,
        code: &str,
    ) -> IdentityResult<Account> {
        let change = self
            .pending
            .get(account_id)
            .await?
            .ok_or(IdentityError::NoPendingChange)?;

        if change.is_expired() {
            self.pending.remove(account_id).await?;
            return Err(IdentityError::CodeExpired);
        }

        let new_email = Email::new(new_email)?;
        if new_email != change.new_email {
            return Err(IdentityError::EmailMismatch);
        }

        if code != change.code {
            return Err(IdentityError::CodeMismatch);
        }

        // Another account may have claimed the address since the request
        if self.repo.find_by_email(&change.new_email).await?.is_some() {
            self.pending.remove(account_id).await?;
            return Err(IdentityError::EmailTaken);
        }

        let mut account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        account.apply_email_change(change.new_email, self.config.email_change_policy);

        // Persist first; a failed write leaves the pending entry so the
        // caller can retry the confirm. The unique constraint breaks the
        // remaining TOCTOU race and surfaces as EmailTaken.
        self.repo.update(&account).await?;
        self.pending.remove(account_id).await?;

        tracing::info!(
            account_id = %account.id,
            role = %account.role,
            "Email change confirmed"
        );

        Ok(account)
    }
}
