//! Application Configuration
//!
//! Configuration for the identity application layer.

use std::time::Duration;

/// Re-export the email change policy alongside the config that selects it
pub use crate::domain::guards::EmailChangePolicy;

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Verification token lifetime (24 hours)
    pub verification_token_ttl: Duration,
    /// Email change code lifetime (10 minutes)
    pub change_code_ttl: Duration,
    /// What happens to privileged roles when the email changes
    pub email_change_policy: EmailChangePolicy,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Cap on list page size
    pub max_page_size: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            verification_token_ttl: Duration::from_secs(24 * 3600), // 24 hours
            change_code_ttl: Duration::from_secs(10 * 60),          // 10 minutes
            email_change_policy: EmailChangePolicy::default(),
            password_pepper: None,
            max_page_size: 100,
        }
    }
}

impl IdentityConfig {
    /// Create config for development (short token TTL for quick expiry testing)
    pub fn development() -> Self {
        Self {
            verification_token_ttl: Duration::from_secs(3600),
            ..Default::default()
        }
    }

    /// Get verification token TTL in milliseconds
    pub fn verification_token_ttl_ms(&self) -> i64 {
        self.verification_token_ttl.as_millis() as i64
    }

    /// Get change code TTL in milliseconds
    pub fn change_code_ttl_ms(&self) -> i64 {
        self.change_code_ttl.as_millis() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
