//! Email Verification Use Case
//!
//! Owns the single outstanding verification token per account: issuing,
//! reading while valid, and consuming it to prove the email reachable.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use platform::crypto::constant_time_eq;

use crate::application::config::IdentityConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::services::generate_verification_token;
use crate::error::{IdentityError, IdentityResult};
use kernel::id::AccountId;

/// Email verification use case
pub struct EmailVerificationUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> EmailVerificationUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    /// Issue a fresh token, overwriting any prior one for the account
    pub async fn issue(&self, account_id: &AccountId) -> IdentityResult<(String, DateTime<Utc>)> {
        let mut account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        let token = generate_verification_token();
        let expires_at =
            Utc::now() + Duration::milliseconds(self.config.verification_token_ttl_ms());
        account.set_verification_token(token.clone(), expires_at);

        self.repo.update(&account).await?;

        tracing::info!(
            account_id = %account.id,
            "Verification token issued"
        );

        Ok((token, expires_at))
    }

    /// The outstanding token, if one exists and has not expired
    ///
    /// Expiry is evaluated on read; an expired token is simply not
    /// returned, never deleted here.
    pub async fn valid_token(
        &self,
        account_id: &AccountId,
    ) -> IdentityResult<Option<(String, DateTime<Utc>)>> {
        let account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        Ok(account
            .valid_verification_token()
            .map(|(token, expires_at)| (token.to_string(), expires_at)))
    }

    /// Consume the token: prove the email and promote `Unverified -> Normal`
    pub async fn confirm(&self, account_id: &AccountId, token: &str) -> IdentityResult<Account> {
        let mut account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        if account.email_verified {
            return Err(IdentityError::AlreadyVerified);
        }

        let (stored, expires_at) = match (&account.verification_token, account.verification_expires_at) {
            (Some(stored), Some(expires_at)) => (stored.clone(), expires_at),
            _ => return Err(IdentityError::InvalidToken),
        };

        if !constant_time_eq(stored.as_bytes(), token.as_bytes()) {
            return Err(IdentityError::InvalidToken);
        }

        if Utc::now() >= expires_at {
            // Unusable but left in place; expiry is lazy
            return Err(IdentityError::TokenExpired);
        }

        account.mark_email_verified();
        self.repo.update(&account).await?;

        tracing::info!(
            account_id = %account.id,
            role = %account.role,
            "Email verified"
        );

        Ok(account)
    }
}
