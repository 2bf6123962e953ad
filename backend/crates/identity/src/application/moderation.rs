//! Moderation Use Case
//!
//! Role and status transitions: promote, demote, ban, unban, delete.
//! Every operation runs the pure guard first and performs exactly one
//! write on success.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::guards::{self, ModerationAction};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::account_role::AccountRole;
use crate::error::{IdentityError, IdentityResult};
use kernel::id::AccountId;

/// Moderation use case
pub struct ModerationUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> ModerationUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Promote the target to admin
    pub async fn promote(
        &self,
        caller: AccountRole,
        target_id: &AccountId,
    ) -> IdentityResult<Account> {
        let mut target = self.load(target_id).await?;
        guards::authorize_moderation(caller, &target, ModerationAction::Promote)?;

        target.set_role(AccountRole::Admin);
        self.repo.update(&target).await?;

        tracing::info!(account_id = %target.id, "Account promoted to admin");
        Ok(target)
    }

    /// Demote the target admin back to normal
    pub async fn demote(
        &self,
        caller: AccountRole,
        target_id: &AccountId,
    ) -> IdentityResult<Account> {
        let mut target = self.load(target_id).await?;
        guards::authorize_moderation(caller, &target, ModerationAction::Demote)?;

        target.set_role(AccountRole::Normal);
        self.repo.update(&target).await?;

        tracing::info!(account_id = %target.id, "Account demoted to normal");
        Ok(target)
    }

    /// Suspend the target. Role is unchanged; a later promote still works.
    pub async fn ban(&self, caller: AccountRole, target_id: &AccountId) -> IdentityResult<Account> {
        let mut target = self.load(target_id).await?;
        guards::authorize_moderation(caller, &target, ModerationAction::Ban)?;

        target.set_active(false);
        self.repo.update(&target).await?;

        tracing::info!(account_id = %target.id, "Account banned");
        Ok(target)
    }

    /// Reinstate the target
    pub async fn unban(
        &self,
        caller: AccountRole,
        target_id: &AccountId,
    ) -> IdentityResult<Account> {
        let mut target = self.load(target_id).await?;
        guards::authorize_moderation(caller, &target, ModerationAction::Unban)?;

        target.set_active(true);
        self.repo.update(&target).await?;

        tracing::info!(account_id = %target.id, "Account unbanned");
        Ok(target)
    }

    /// Delete the target permanently. Returns the final snapshot.
    pub async fn delete(
        &self,
        caller: AccountRole,
        target_id: &AccountId,
    ) -> IdentityResult<Account> {
        let target = self.load(target_id).await?;
        guards::authorize_moderation(caller, &target, ModerationAction::Delete)?;

        self.repo.delete(target_id).await?;

        tracing::info!(account_id = %target.id, "Account deleted");
        Ok(target)
    }

    async fn load(&self, target_id: &AccountId) -> IdentityResult<Account> {
        self.repo
            .find_by_id(target_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }
}
