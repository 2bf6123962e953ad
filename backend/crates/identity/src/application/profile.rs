//! Update Profile Use Case
//!
//! Name and image updates. Owners may edit themselves; anyone else needs
//! admin or higher. Email never changes through here - that is the
//! two-phase email change flow.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{account_role::AccountRole, person_name::PersonName};
use crate::error::{IdentityError, IdentityResult};
use kernel::id::AccountId;

/// Update profile input; only supplied fields are touched
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Update profile use case
pub struct UpdateProfileUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateProfileUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        caller_id: &AccountId,
        caller_role: AccountRole,
        account_id: &AccountId,
        input: UpdateProfileInput,
    ) -> IdentityResult<Account> {
        if caller_id != account_id && !caller_role.is_admin_or_higher() {
            return Err(IdentityError::AdminRequired);
        }

        let mut account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        // Validate everything before the first mutation
        let first_name = input.first_name.map(PersonName::new).transpose()?;
        let last_name = input.last_name.map(PersonName::new).transpose()?;

        if first_name.is_some() || last_name.is_some() {
            account.set_name(first_name, last_name);
        }
        if let Some(url) = input.profile_image_url {
            account.set_profile_image(Some(url));
        }

        self.repo.update(&account).await?;

        tracing::info!(account_id = %account.id, "Profile updated");

        Ok(account)
    }
}
