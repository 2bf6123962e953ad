//! Register Use Case
//!
//! Creates a new account with a pending verification token.

use std::sync::Arc;

use chrono::{Duration, Utc};
use platform::password::ClearTextPassword;

use crate::application::config::IdentityConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::services::generate_verification_token;
use crate::domain::value_object::{email::Email, person_name::PersonName};
use crate::error::{IdentityError, IdentityResult};

/// Register input
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Register output
///
/// Carries the fresh verification token so the boundary can hand it to
/// whoever delivers the verification email.
pub struct RegisterOutput {
    pub account: Account,
    pub verification_token: String,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<RegisterOutput> {
        // Validate fields
        let first_name = PersonName::new(input.first_name)?;
        let last_name = PersonName::new(input.last_name)?;
        let email = Email::new(input.email)?;

        // Read-time uniqueness check; the store's unique constraint is
        // the authority if a concurrent insert slips in between.
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        // Validate and hash password (length policy only)
        let password = ClearTextPassword::new(input.password)
            .map_err(|e| IdentityError::Validation(e.to_string()))?;
        let password_hash = password
            .hash(self.config.pepper())
            .map_err(|e| IdentityError::Internal(e.to_string()))?;

        // Create account with a pending verification token
        let mut account = Account::new(first_name, last_name, email, password_hash);
        let token = generate_verification_token();
        let expires_at =
            Utc::now() + Duration::milliseconds(self.config.verification_token_ttl_ms());
        account.set_verification_token(token.clone(), expires_at);

        self.repo.insert(&account).await?;

        tracing::info!(
            account_id = %account.id,
            "Account registered"
        );

        Ok(RegisterOutput {
            account,
            verification_token: token,
        })
    }
}
