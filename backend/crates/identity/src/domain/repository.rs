//! Repository Traits
//!
//! Interfaces for data persistence and outbound collaborators.
//! Implementations live in the infrastructure layer.

use crate::domain::entity::{account::Account, pending_email_change::PendingEmailChange};
use crate::domain::value_object::email::Email;
use crate::error::IdentityResult;
use kernel::id::AccountId;

/// Account repository trait
///
/// The store must enforce email uniqueness at commit time: an `insert` or
/// `update` that would duplicate an email fails with
/// [`IdentityError::EmailTaken`](crate::error::IdentityError::EmailTaken)
/// even when an earlier read-time check passed. Writes are atomic per
/// account row.
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account
    async fn insert(&self, account: &Account) -> IdentityResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, id: &AccountId) -> IdentityResult<Option<Account>>;

    /// Find account by email (already lowercased by the value object)
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>>;

    /// Update an existing account
    async fn update(&self, account: &Account) -> IdentityResult<()>;

    /// Delete an account
    async fn delete(&self, id: &AccountId) -> IdentityResult<()>;

    /// List accounts, newest first, with the total count
    async fn list(&self, page: u32, page_size: u32) -> IdentityResult<(Vec<Account>, u64)>;
}

/// Pending email change store trait
///
/// A keyed get/put/remove store with at most one entry per account;
/// `put` replaces any prior entry (last writer wins). The reference
/// implementation is process-local; a production deployment can back it
/// with an external fast key-value store without touching the use cases.
#[trait_variant::make(PendingChangeStore: Send)]
pub trait LocalPendingChangeStore {
    /// Store a pending change, replacing any prior one for the account
    async fn put(&self, change: &PendingEmailChange) -> IdentityResult<()>;

    /// Fetch the pending change for an account
    async fn get(&self, account_id: &AccountId) -> IdentityResult<Option<PendingEmailChange>>;

    /// Remove the pending change for an account (no-op when absent)
    async fn remove(&self, account_id: &AccountId) -> IdentityResult<()>;
}

/// Outbound change code delivery trait
///
/// Delivery itself is an external concern; the use cases only need to
/// know whether handoff succeeded.
#[trait_variant::make(ChangeCodeNotifier: Send)]
pub trait LocalChangeCodeNotifier {
    /// Deliver a change code to the candidate address
    async fn send_code(&self, email: &Email, code: &str) -> IdentityResult<()>;
}
