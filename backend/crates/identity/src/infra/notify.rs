//! Change Code Notifier Implementations

use crate::domain::repository::ChangeCodeNotifier;
use crate::domain::value_object::email::Email;
use crate::error::IdentityResult;

/// Development notifier: logs the handoff instead of sending.
///
/// Real delivery belongs to the mailer service behind the
/// `ChangeCodeNotifier` seam; the code itself is never logged.
#[derive(Debug, Clone, Default)]
pub struct TracingChangeCodeNotifier;

impl TracingChangeCodeNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl ChangeCodeNotifier for TracingChangeCodeNotifier {
    async fn send_code(&self, email: &Email, code: &str) -> IdentityResult<()> {
        tracing::info!(
            email = %email,
            code_len = code.len(),
            "Change code handed off for delivery"
        );
        Ok(())
    }
}
