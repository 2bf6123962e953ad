//! Identity Backend Module
//!
//! Account identity and verification state machine:
//! - `domain/` - Entities, value objects, guard logic, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - Postgres repository, in-memory stores, notifier
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration with single-use, expiring verification tokens
//! - Two-phase email change (request a 6-digit code, confirm it)
//! - Role tiers (Unverified, Normal, Admin, SuperAdmin) with pure guards
//! - Ban/unban and protected deletion
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Verification secrets compared in constant time
//! - Caller identity is asserted by the gateway; this service validates
//!   no tokens itself
//! - Email uniqueness is enforced by the store at commit time, so
//!   read-check races cannot produce duplicates

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use infra::postgres::PgAccountRepository;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::account::Account;
    pub use crate::domain::entity::pending_email_change::PendingEmailChange;
    pub use crate::domain::value_object::account_role::AccountRole;
    pub use crate::domain::value_object::email::Email;
    pub use crate::domain::value_object::person_name::PersonName;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::{InMemoryAccountRepository, InMemoryPendingChangeStore};
    pub use crate::infra::postgres::PgAccountRepository as AccountStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
