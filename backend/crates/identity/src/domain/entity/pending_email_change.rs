//! Pending Email Change Entity
//!
//! The in-flight half of a two-phase email change: the candidate address
//! and the code that was sent to it. At most one exists per account; a
//! newer request replaces the older one.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::email::Email;
use kernel::id::AccountId;

/// Pending email change record, keyed by the requesting account
#[derive(Debug, Clone)]
pub struct PendingEmailChange {
    pub account_id: AccountId,
    pub new_email: Email,
    /// 6 decimal digits, compared by exact string equality
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PendingEmailChange {
    /// Create a new pending change expiring `ttl_ms` from now
    pub fn new(account_id: AccountId, new_email: Email, code: String, ttl_ms: i64) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            new_email,
            code,
            expires_at: now + Duration::milliseconds(ttl_ms),
            created_at: now,
        }
    }

    /// Check if the change has expired (evaluated lazily, nothing sweeps)
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
