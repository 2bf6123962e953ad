//! Role & Status Guards
//!
//! Pure decision logic for role and status transitions. Given the
//! caller's role, the target account, and the attempted action, these
//! functions either accept or reject with a specific reason. No I/O
//! happens here; the application layer runs a guard before every
//! mutating write.

use crate::domain::entity::account::Account;
use crate::domain::value_object::account_role::AccountRole;
use crate::error::{IdentityError, IdentityResult};

/// Moderation actions subject to role guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Promote,
    Demote,
    Ban,
    Unban,
    Delete,
}

/// What happens to a role when the account's email changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailChangePolicy {
    /// Admin and SuperAdmin keep their role; everyone else resets to Unverified
    #[default]
    PreservePrivileged,
    /// Every role resets to Unverified
    AlwaysReset,
}

/// Decide whether `caller` may apply `action` to `target`.
///
/// Check order: caller privilege first, then target protection, then
/// target state. Every rejection carries its specific reason.
pub fn authorize_moderation(
    caller: AccountRole,
    target: &Account,
    action: ModerationAction,
) -> IdentityResult<()> {
    match action {
        ModerationAction::Promote => {
            if !caller.is_super_admin() {
                return Err(IdentityError::SuperAdminRequired);
            }
            // Promotion from Unverified is allowed; only an existing
            // privileged role blocks it.
            if target.role.is_admin_or_higher() {
                return Err(IdentityError::AlreadyPrivileged);
            }
            Ok(())
        }
        ModerationAction::Demote => {
            if !caller.is_super_admin() {
                return Err(IdentityError::SuperAdminRequired);
            }
            if target.role.is_super_admin() {
                return Err(IdentityError::Protected);
            }
            if target.role != AccountRole::Admin {
                return Err(IdentityError::NotAdmin);
            }
            Ok(())
        }
        ModerationAction::Ban => {
            if !caller.is_admin_or_higher() {
                return Err(IdentityError::AdminRequired);
            }
            if target.role.is_admin_or_higher() {
                return Err(IdentityError::Protected);
            }
            Ok(())
        }
        ModerationAction::Unban => {
            if !caller.is_admin_or_higher() {
                return Err(IdentityError::AdminRequired);
            }
            Ok(())
        }
        ModerationAction::Delete => {
            if !caller.is_super_admin() {
                return Err(IdentityError::SuperAdminRequired);
            }
            if target.role.is_super_admin() {
                return Err(IdentityError::Protected);
            }
            Ok(())
        }
    }
}

/// Role after a successful email verification
///
/// `Unverified -> Normal`; verifying an already-privileged account leaves
/// its role unchanged.
pub fn role_after_verification(current: AccountRole) -> AccountRole {
    match current {
        AccountRole::Unverified => AccountRole::Normal,
        other => other,
    }
}

/// Role after a confirmed email change, per `policy`
pub fn role_after_email_change(current: AccountRole, policy: EmailChangePolicy) -> AccountRole {
    match policy {
        EmailChangePolicy::PreservePrivileged if current.is_admin_or_higher() => current,
        _ => AccountRole::Unverified,
    }
}
