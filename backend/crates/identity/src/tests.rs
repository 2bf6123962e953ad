//! Use-case tests for the identity crate
//!
//! Run against the in-memory adapters, which give the same commit-time
//! uniqueness guarantees as the Postgres repository.

use std::sync::{Arc, Mutex, OnceLock};

use platform::password::{ClearTextPassword, HashedPassword};

use crate::application::config::IdentityConfig;
use crate::application::{RegisterInput, RegisterOutput, RegisterUseCase};
use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, ChangeCodeNotifier};
use crate::domain::value_object::account_role::AccountRole;
use crate::domain::value_object::{email::Email, person_name::PersonName};
use crate::error::{IdentityError, IdentityResult};
use crate::infra::memory::{InMemoryAccountRepository, InMemoryPendingChangeStore};
use kernel::id::AccountId;

const TEST_PASSWORD: &str = "plenty long password";

/// Argon2 is deliberately slow; hash once and reuse the PHC string.
fn password_hash() -> HashedPassword {
    static PHC: OnceLock<String> = OnceLock::new();
    let phc = PHC.get_or_init(|| {
        ClearTextPassword::new(TEST_PASSWORD.to_string())
            .unwrap()
            .hash(None)
            .unwrap()
            .as_phc_string()
            .to_string()
    });
    HashedPassword::from_phc_string(phc.clone()).unwrap()
}

fn account_with_role(email: &str, role: AccountRole) -> Account {
    let mut account = Account::new(
        PersonName::new("Test").unwrap(),
        PersonName::new("Account").unwrap(),
        Email::new(email).unwrap(),
        password_hash(),
    );
    account.role = role;
    account
}

fn test_config() -> Arc<IdentityConfig> {
    Arc::new(IdentityConfig::default())
}

async fn seed(
    repo: &Arc<InMemoryAccountRepository>,
    email: &str,
    role: AccountRole,
) -> AccountId {
    let account = account_with_role(email, role);
    repo.insert(&account).await.unwrap();
    account.id
}

async fn register(
    repo: &Arc<InMemoryAccountRepository>,
    config: &Arc<IdentityConfig>,
    email: &str,
) -> RegisterOutput {
    RegisterUseCase::new(repo.clone(), config.clone())
        .execute(RegisterInput {
            first_name: "Test".to_string(),
            last_name: "Account".to_string(),
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .unwrap()
}

/// Notifier double that records every handoff
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn last(&self) -> Option<(String, String)> {
        self.sent.lock().unwrap().last().cloned()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl ChangeCodeNotifier for RecordingNotifier {
    async fn send_code(&self, email: &Email, code: &str) -> IdentityResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.as_str().to_string(), code.to_string()));
        Ok(())
    }
}

/// Notifier double whose delivery always fails
struct FailingNotifier;

impl ChangeCodeNotifier for FailingNotifier {
    async fn send_code(&self, _email: &Email, _code: &str) -> IdentityResult<()> {
        Err(IdentityError::NotificationFailed(
            "smtp connection refused".to_string(),
        ))
    }
}

// ============================================================================
// Registration
// ============================================================================

#[cfg(test)]
mod register_tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_register_creates_unverified_account() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let output = register(&repo, &test_config(), "ada@example.com").await;

        let account = &output.account;
        assert_eq!(account.role, AccountRole::Unverified);
        assert!(!account.email_verified);
        assert!(account.active);
        assert_eq!(account.email.as_str(), "ada@example.com");

        // A verification token is outstanding with a future expiry
        assert_eq!(
            account.verification_token.as_deref(),
            Some(output.verification_token.as_str())
        );
        assert!(account.verification_expires_at.unwrap() > Utc::now());

        // The password verifies against the stored hash
        let password = ClearTextPassword::new(TEST_PASSWORD.to_string()).unwrap();
        assert!(account.password_hash.verify(&password, None));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();

        register(&repo, &config, "ada@example.com").await;

        // Same address, different case
        let result = RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                first_name: "Other".to_string(),
                last_name: "Person".to_string(),
                email: "Ada@Example.COM".to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await;

        assert!(matches!(result, Err(IdentityError::EmailTaken)));

        let (_, total) = repo.list(1, 10).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_register_concurrent_same_email_single_winner() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        let use_case = RegisterUseCase::new(repo.clone(), config.clone());

        let input = |first: &str| RegisterInput {
            first_name: first.to_string(),
            last_name: "Account".to_string(),
            email: "race@example.com".to_string(),
            password: TEST_PASSWORD.to_string(),
        };

        let (a, b) = tokio::join!(use_case.execute(input("A")), use_case.execute(input("B")));

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert!(matches!(
            [a, b].into_iter().find(|r| r.is_err()).unwrap(),
            Err(IdentityError::EmailTaken)
        ));

        let (_, total) = repo.list(1, 10).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let use_case = RegisterUseCase::new(repo.clone(), test_config());

        // Short password
        let result = use_case
            .execute(RegisterInput {
                first_name: "Test".to_string(),
                last_name: "Account".to_string(),
                email: "short@example.com".to_string(),
                password: "short".to_string(),
            })
            .await;
        assert!(matches!(result, Err(IdentityError::Validation(_))));

        // Oversized name
        let result = use_case
            .execute(RegisterInput {
                first_name: "x".repeat(51),
                last_name: "Account".to_string(),
                email: "long@example.com".to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await;
        assert!(matches!(result, Err(IdentityError::Validation(_))));

        // Malformed email
        let result = use_case
            .execute(RegisterInput {
                first_name: "Test".to_string(),
                last_name: "Account".to_string(),
                email: "not-an-email".to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await;
        assert!(matches!(result, Err(IdentityError::Validation(_))));

        // Nothing was persisted
        let (_, total) = repo.list(1, 10).await.unwrap();
        assert_eq!(total, 0);
    }
}

// ============================================================================
// Email verification
// ============================================================================

#[cfg(test)]
mod verification_tests {
    use super::*;
    use crate::application::EmailVerificationUseCase;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_verify_email_promotes_unverified_to_normal() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        let output = register(&repo, &config, "ada@example.com").await;

        let use_case = EmailVerificationUseCase::new(repo.clone(), config.clone());
        let account = use_case
            .confirm(&output.account.id, &output.verification_token)
            .await
            .unwrap();

        assert!(account.email_verified);
        assert_eq!(account.role, AccountRole::Normal);
        assert!(account.verification_token.is_none());
        assert!(account.verification_expires_at.is_none());

        // Token fields are gone from the persisted record too
        assert!(use_case.valid_token(&account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_email_twice_returns_already_verified() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        let output = register(&repo, &config, "ada@example.com").await;

        let use_case = EmailVerificationUseCase::new(repo.clone(), config.clone());
        use_case
            .confirm(&output.account.id, &output.verification_token)
            .await
            .unwrap();

        let result = use_case
            .confirm(&output.account.id, &output.verification_token)
            .await;
        assert!(matches!(result, Err(IdentityError::AlreadyVerified)));
    }

    #[tokio::test]
    async fn test_verify_email_wrong_token_does_not_mutate() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        let output = register(&repo, &config, "ada@example.com").await;

        let use_case = EmailVerificationUseCase::new(repo.clone(), config.clone());
        let result = use_case.confirm(&output.account.id, "wrong-token").await;
        assert!(matches!(result, Err(IdentityError::InvalidToken)));

        let stored = repo.find_by_id(&output.account.id).await.unwrap().unwrap();
        assert!(!stored.email_verified);
        assert_eq!(stored.role, AccountRole::Unverified);
    }

    #[tokio::test]
    async fn test_verify_email_expired_token() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        let output = register(&repo, &config, "ada@example.com").await;

        // Age the token past its expiry
        let mut stored = repo.find_by_id(&output.account.id).await.unwrap().unwrap();
        stored.verification_expires_at = Some(Utc::now() - Duration::hours(1));
        repo.update(&stored).await.unwrap();

        let use_case = EmailVerificationUseCase::new(repo.clone(), config.clone());
        let result = use_case
            .confirm(&output.account.id, &output.verification_token)
            .await;
        assert!(matches!(result, Err(IdentityError::TokenExpired)));

        // Expiry is lazy: the record is untouched, just unusable
        let stored = repo.find_by_id(&output.account.id).await.unwrap().unwrap();
        assert!(!stored.email_verified);
        assert!(stored.verification_token.is_some());

        assert!(use_case.valid_token(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_email_preserves_privileged_role() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        let output = register(&repo, &config, "admin@example.com").await;

        let mut stored = repo.find_by_id(&output.account.id).await.unwrap().unwrap();
        stored.role = AccountRole::Admin;
        repo.update(&stored).await.unwrap();

        let use_case = EmailVerificationUseCase::new(repo.clone(), config.clone());
        let account = use_case
            .confirm(&output.account.id, &output.verification_token)
            .await
            .unwrap();

        assert!(account.email_verified);
        assert_eq!(account.role, AccountRole::Admin);
    }

    #[tokio::test]
    async fn test_issue_overwrites_prior_token() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        let output = register(&repo, &config, "ada@example.com").await;

        let use_case = EmailVerificationUseCase::new(repo.clone(), config.clone());
        let (fresh, _) = use_case.issue(&output.account.id).await.unwrap();
        assert_ne!(fresh, output.verification_token);

        // The replaced token no longer verifies
        let result = use_case
            .confirm(&output.account.id, &output.verification_token)
            .await;
        assert!(matches!(result, Err(IdentityError::InvalidToken)));

        // The fresh one does
        let account = use_case.confirm(&output.account.id, &fresh).await.unwrap();
        assert!(account.email_verified);
    }

    #[tokio::test]
    async fn test_verify_unknown_account() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let use_case = EmailVerificationUseCase::new(repo.clone(), test_config());

        let result = use_case.confirm(&AccountId::new(), "token").await;
        assert!(matches!(result, Err(IdentityError::AccountNotFound)));
    }
}

// ============================================================================
// Email change
// ============================================================================

#[cfg(test)]
mod email_change_tests {
    use super::*;
    use crate::application::{EmailChangeUseCase, EmailVerificationUseCase};
    use crate::domain::entity::pending_email_change::PendingEmailChange;
    use crate::domain::guards::EmailChangePolicy;
    use crate::domain::repository::PendingChangeStore;

    struct Fixture {
        repo: Arc<InMemoryAccountRepository>,
        pending: Arc<InMemoryPendingChangeStore>,
        notifier: Arc<RecordingNotifier>,
        config: Arc<IdentityConfig>,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(IdentityConfig::default())
        }

        fn with_config(config: IdentityConfig) -> Self {
            Self {
                repo: Arc::new(InMemoryAccountRepository::new()),
                pending: Arc::new(InMemoryPendingChangeStore::new()),
                notifier: Arc::new(RecordingNotifier::default()),
                config: Arc::new(config),
            }
        }

        fn use_case(
            &self,
        ) -> EmailChangeUseCase<InMemoryAccountRepository, InMemoryPendingChangeStore, RecordingNotifier>
        {
            EmailChangeUseCase::new(
                self.repo.clone(),
                self.pending.clone(),
                self.notifier.clone(),
                self.config.clone(),
            )
        }
    }

    #[tokio::test]
    async fn test_request_and_confirm_round_trip() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;
        let use_case = fx.use_case();

        use_case
            .request(&output.account.id, "new@example.com".to_string())
            .await
            .unwrap();

        // The code went to the candidate address
        let (sent_to, code) = fx.notifier.last().unwrap();
        assert_eq!(sent_to, "new@example.com");
        assert_eq!(code.len(), 6);

        let account = use_case
            .confirm(&output.account.id, "new@example.com".to_string(), &code)
            .await
            .unwrap();

        assert_eq!(account.email.as_str(), "new@example.com");
        assert!(!account.email_verified);

        // Single-use: the pending entry is gone
        assert!(fx.pending.get(&account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_confirm_is_case_insensitive_on_email() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;
        let use_case = fx.use_case();

        use_case
            .request(&output.account.id, "New@Example.COM".to_string())
            .await
            .unwrap();
        let (_, code) = fx.notifier.last().unwrap();

        let account = use_case
            .confirm(&output.account.id, "new@example.com".to_string(), &code)
            .await
            .unwrap();
        assert_eq!(account.email.as_str(), "new@example.com");
    }

    #[tokio::test]
    async fn test_request_same_email_rejected() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "ada@example.com").await;

        let result = fx
            .use_case()
            .request(&output.account.id, "Ada@Example.com".to_string())
            .await;
        assert!(matches!(result, Err(IdentityError::SameEmail)));
        assert_eq!(fx.notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_request_taken_email_rejected() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "ada@example.com").await;
        register(&fx.repo, &fx.config, "taken@example.com").await;

        let result = fx
            .use_case()
            .request(&output.account.id, "taken@example.com".to_string())
            .await;
        assert!(matches!(result, Err(IdentityError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_request_notification_failure_leaves_no_pending_entry() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "ada@example.com").await;

        let use_case = EmailChangeUseCase::new(
            fx.repo.clone(),
            fx.pending.clone(),
            Arc::new(FailingNotifier),
            fx.config.clone(),
        );

        let result = use_case
            .request(&output.account.id, "new@example.com".to_string())
            .await;
        assert!(matches!(result, Err(IdentityError::NotificationFailed(_))));

        // No undelivered code may linger
        assert!(fx.pending.get(&output.account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_confirm_without_request() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "ada@example.com").await;

        let result = fx
            .use_case()
            .confirm(
                &output.account.id,
                "new@example.com".to_string(),
                "123456",
            )
            .await;
        assert!(matches!(result, Err(IdentityError::NoPendingChange)));
    }

    #[tokio::test]
    async fn test_confirm_wrong_code_leaves_email_unchanged() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;
        let use_case = fx.use_case();

        use_case
            .request(&output.account.id, "new@example.com".to_string())
            .await
            .unwrap();
        let (_, code) = fx.notifier.last().unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let result = use_case
            .confirm(&output.account.id, "new@example.com".to_string(), wrong)
            .await;
        assert!(matches!(result, Err(IdentityError::CodeMismatch)));

        let stored = fx.repo.find_by_id(&output.account.id).await.unwrap().unwrap();
        assert_eq!(stored.email.as_str(), "old@example.com");

        // The pending entry survives, so the right code still works
        let account = use_case
            .confirm(&output.account.id, "new@example.com".to_string(), &code)
            .await
            .unwrap();
        assert_eq!(account.email.as_str(), "new@example.com");
    }

    #[tokio::test]
    async fn test_confirm_email_mismatch() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;
        let use_case = fx.use_case();

        use_case
            .request(&output.account.id, "new@example.com".to_string())
            .await
            .unwrap();
        let (_, code) = fx.notifier.last().unwrap();

        let result = use_case
            .confirm(&output.account.id, "other@example.com".to_string(), &code)
            .await;
        assert!(matches!(result, Err(IdentityError::EmailMismatch)));
    }

    #[tokio::test]
    async fn test_confirm_expired_code_deletes_entry() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;

        // Plant an already-expired pending change
        let expired = PendingEmailChange::new(
            output.account.id,
            Email::new("new@example.com").unwrap(),
            "123456".to_string(),
            -1_000,
        );
        fx.pending.put(&expired).await.unwrap();

        let result = fx
            .use_case()
            .confirm(
                &output.account.id,
                "new@example.com".to_string(),
                "123456",
            )
            .await;
        assert!(matches!(result, Err(IdentityError::CodeExpired)));

        // Expired entries are removed on confirm
        assert!(fx.pending.get(&output.account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_confirm_email_taken_since_request() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;
        let use_case = fx.use_case();

        use_case
            .request(&output.account.id, "new@example.com".to_string())
            .await
            .unwrap();
        let (_, code) = fx.notifier.last().unwrap();

        // Someone else claims the address between request and confirm
        register(&fx.repo, &fx.config, "new@example.com").await;

        let result = use_case
            .confirm(&output.account.id, "new@example.com".to_string(), &code)
            .await;
        assert!(matches!(result, Err(IdentityError::EmailTaken)));
        assert!(fx.pending.get(&output.account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_request_replaces_prior_code() {
        let fx = Fixture::new();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;
        let use_case = fx.use_case();

        use_case
            .request(&output.account.id, "first@example.com".to_string())
            .await
            .unwrap();
        let (_, first_code) = fx.notifier.last().unwrap();

        use_case
            .request(&output.account.id, "second@example.com".to_string())
            .await
            .unwrap();
        let (_, second_code) = fx.notifier.last().unwrap();

        // The earlier request is dead
        let result = use_case
            .confirm(
                &output.account.id,
                "first@example.com".to_string(),
                &first_code,
            )
            .await;
        assert!(matches!(result, Err(IdentityError::EmailMismatch)));

        let account = use_case
            .confirm(
                &output.account.id,
                "second@example.com".to_string(),
                &second_code,
            )
            .await
            .unwrap();
        assert_eq!(account.email.as_str(), "second@example.com");
    }

    #[tokio::test]
    async fn test_role_reset_for_normal_account() {
        let fx = Fixture::new();
        let config = fx.config.clone();
        let output = register(&fx.repo, &fx.config, "old@example.com").await;

        // Verify first so the account holds Normal
        let verification = EmailVerificationUseCase::new(fx.repo.clone(), config.clone());
        verification
            .confirm(&output.account.id, &output.verification_token)
            .await
            .unwrap();

        let use_case = fx.use_case();
        use_case
            .request(&output.account.id, "new@example.com".to_string())
            .await
            .unwrap();
        let (_, code) = fx.notifier.last().unwrap();

        let account = use_case
            .confirm(&output.account.id, "new@example.com".to_string(), &code)
            .await
            .unwrap();

        assert_eq!(account.role, AccountRole::Unverified);
        assert!(!account.email_verified);
    }

    #[tokio::test]
    async fn test_privileged_role_preserved_by_default_policy() {
        let fx = Fixture::new();
        let id = seed(&fx.repo, "admin@example.com", AccountRole::Admin).await;
        let use_case = fx.use_case();

        use_case
            .request(&id, "new@example.com".to_string())
            .await
            .unwrap();
        let (_, code) = fx.notifier.last().unwrap();

        let account = use_case
            .confirm(&id, "new@example.com".to_string(), &code)
            .await
            .unwrap();

        assert_eq!(account.role, AccountRole::Admin);
        assert!(!account.email_verified);
    }

    #[tokio::test]
    async fn test_always_reset_policy_demotes_admin() {
        let fx = Fixture::with_config(IdentityConfig {
            email_change_policy: EmailChangePolicy::AlwaysReset,
            ..Default::default()
        });
        let id = seed(&fx.repo, "admin@example.com", AccountRole::Admin).await;
        let use_case = fx.use_case();

        use_case
            .request(&id, "new@example.com".to_string())
            .await
            .unwrap();
        let (_, code) = fx.notifier.last().unwrap();

        let account = use_case
            .confirm(&id, "new@example.com".to_string(), &code)
            .await
            .unwrap();

        assert_eq!(account.role, AccountRole::Unverified);
    }
}

// ============================================================================
// Moderation
// ============================================================================

#[cfg(test)]
mod moderation_tests {
    use super::*;
    use crate::application::ModerationUseCase;

    #[tokio::test]
    async fn test_super_admin_is_immune() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "root@example.com", AccountRole::SuperAdmin).await;
        let use_case = ModerationUseCase::new(repo.clone());

        assert!(matches!(
            use_case.ban(AccountRole::SuperAdmin, &id).await,
            Err(IdentityError::Protected)
        ));
        assert!(matches!(
            use_case.demote(AccountRole::SuperAdmin, &id).await,
            Err(IdentityError::Protected)
        ));
        assert!(matches!(
            use_case.delete(AccountRole::SuperAdmin, &id).await,
            Err(IdentityError::Protected)
        ));

        // Record is unchanged
        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.role, AccountRole::SuperAdmin);
        assert!(stored.active);
    }

    #[tokio::test]
    async fn test_ban_keeps_role_and_does_not_block_promote() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = ModerationUseCase::new(repo.clone());

        let banned = use_case.ban(AccountRole::Admin, &id).await.unwrap();
        assert!(!banned.active);
        assert_eq!(banned.role, AccountRole::Normal);

        // Ban does not block role changes
        let promoted = use_case.promote(AccountRole::SuperAdmin, &id).await.unwrap();
        assert_eq!(promoted.role, AccountRole::Admin);
        assert!(!promoted.active);
    }

    #[tokio::test]
    async fn test_unban_restores_access_flag() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = ModerationUseCase::new(repo.clone());

        use_case.ban(AccountRole::Admin, &id).await.unwrap();
        let restored = use_case.unban(AccountRole::Admin, &id).await.unwrap();
        assert!(restored.active);
    }

    #[tokio::test]
    async fn test_promote_directly_from_unverified() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "fresh@example.com", AccountRole::Unverified).await;
        let use_case = ModerationUseCase::new(repo.clone());

        let promoted = use_case.promote(AccountRole::SuperAdmin, &id).await.unwrap();
        assert_eq!(promoted.role, AccountRole::Admin);
    }

    #[tokio::test]
    async fn test_promote_rejections() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = ModerationUseCase::new(repo.clone());

        assert!(matches!(
            use_case.promote(AccountRole::Admin, &id).await,
            Err(IdentityError::SuperAdminRequired)
        ));

        let admin_id = seed(&repo, "admin@example.com", AccountRole::Admin).await;
        assert!(matches!(
            use_case.promote(AccountRole::SuperAdmin, &admin_id).await,
            Err(IdentityError::AlreadyPrivileged)
        ));
    }

    #[tokio::test]
    async fn test_demote_rejections() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = ModerationUseCase::new(repo.clone());

        assert!(matches!(
            use_case.demote(AccountRole::SuperAdmin, &id).await,
            Err(IdentityError::NotAdmin)
        ));
    }

    #[tokio::test]
    async fn test_demote_admin_succeeds() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "admin@example.com", AccountRole::Admin).await;
        let use_case = ModerationUseCase::new(repo.clone());

        let demoted = use_case.demote(AccountRole::SuperAdmin, &id).await.unwrap();
        assert_eq!(demoted.role, AccountRole::Normal);
    }

    #[tokio::test]
    async fn test_ban_requires_admin_caller() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = ModerationUseCase::new(repo.clone());

        assert!(matches!(
            use_case.ban(AccountRole::Normal, &id).await,
            Err(IdentityError::AdminRequired)
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_account() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = ModerationUseCase::new(repo.clone());

        let snapshot = use_case.delete(AccountRole::SuperAdmin, &id).await.unwrap();
        assert_eq!(snapshot.email.as_str(), "user@example.com");

        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_moderation_unknown_target() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let use_case = ModerationUseCase::new(repo.clone());

        assert!(matches!(
            use_case.ban(AccountRole::Admin, &AccountId::new()).await,
            Err(IdentityError::AccountNotFound)
        ));
    }
}

// ============================================================================
// Queries
// ============================================================================

#[cfg(test)]
mod query_tests {
    use super::*;
    use crate::application::AccountQueryUseCase;

    #[tokio::test]
    async fn test_by_email_is_case_insensitive() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        register(&repo, &config, "Ada@Example.com").await;

        let use_case = AccountQueryUseCase::new(repo.clone(), config.clone());
        let account = use_case.by_email("ada@example.COM").await.unwrap();
        assert_eq!(account.email.as_str(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_by_id_not_found() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let use_case = AccountQueryUseCase::new(repo.clone(), test_config());

        assert!(matches!(
            use_case.by_id(&AccountId::new()).await,
            Err(IdentityError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_pagination() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        register(&repo, &config, "first@example.com").await;
        register(&repo, &config, "second@example.com").await;
        register(&repo, &config, "third@example.com").await;

        let use_case = AccountQueryUseCase::new(repo.clone(), config.clone());

        let page = use_case.list(1, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].email.as_str(), "third@example.com");
        assert_eq!(page.items[1].email.as_str(), "second@example.com");

        let page = use_case.list(2, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].email.as_str(), "first@example.com");
    }

    #[tokio::test]
    async fn test_list_clamps_page_inputs() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = test_config();
        register(&repo, &config, "only@example.com").await;

        let use_case = AccountQueryUseCase::new(repo.clone(), config.clone());

        let page = use_case.list(0, 1000).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, config.max_page_size);
        assert_eq!(page.items.len(), 1);
    }
}

// ============================================================================
// Profile updates
// ============================================================================

#[cfg(test)]
mod profile_tests {
    use super::*;
    use crate::application::{UpdateProfileInput, UpdateProfileUseCase};

    #[tokio::test]
    async fn test_owner_updates_own_profile() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = UpdateProfileUseCase::new(repo.clone());

        let account = use_case
            .execute(
                &id,
                AccountRole::Normal,
                &id,
                UpdateProfileInput {
                    first_name: Some("Grace".to_string()),
                    last_name: None,
                    profile_image_url: Some("https://img.example.com/g.png".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(account.first_name.as_str(), "Grace");
        assert_eq!(account.last_name.as_str(), "Account");
        assert_eq!(
            account.profile_image_url.as_deref(),
            Some("https://img.example.com/g.png")
        );
    }

    #[tokio::test]
    async fn test_non_owner_requires_admin() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let target = seed(&repo, "target@example.com", AccountRole::Normal).await;
        let other = AccountId::new();
        let use_case = UpdateProfileUseCase::new(repo.clone());

        let result = use_case
            .execute(
                &other,
                AccountRole::Normal,
                &target,
                UpdateProfileInput {
                    first_name: Some("Mallory".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(IdentityError::AdminRequired)));

        // Admin callers may edit others
        let account = use_case
            .execute(
                &other,
                AccountRole::Admin,
                &target,
                UpdateProfileInput {
                    first_name: Some("Grace".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(account.first_name.as_str(), "Grace");
    }

    #[tokio::test]
    async fn test_oversized_name_rejected_without_mutation() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let id = seed(&repo, "user@example.com", AccountRole::Normal).await;
        let use_case = UpdateProfileUseCase::new(repo.clone());

        let result = use_case
            .execute(
                &id,
                AccountRole::Normal,
                &id,
                UpdateProfileInput {
                    first_name: Some("x".repeat(51)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(IdentityError::Validation(_))));

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.first_name.as_str(), "Test");
    }
}

// ============================================================================
// Config and DTOs
// ============================================================================

#[cfg(test)]
mod config_tests {
    use crate::application::config::{EmailChangePolicy, IdentityConfig};
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = IdentityConfig::default();

        assert_eq!(config.verification_token_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.change_code_ttl, Duration::from_secs(600));
        assert_eq!(
            config.email_change_policy,
            EmailChangePolicy::PreservePrivileged
        );
        assert!(config.password_pepper.is_none());
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn test_ttl_millisecond_helpers() {
        let config = IdentityConfig::default();
        assert_eq!(config.verification_token_ttl_ms(), 24 * 3600 * 1000);
        assert_eq!(config.change_code_ttl_ms(), 600 * 1000);
    }

    #[test]
    fn test_development_config() {
        let config = IdentityConfig::development();
        assert_eq!(config.verification_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.change_code_ttl, Duration::from_secs(600));
    }
}

#[cfg(test)]
mod dto_tests {
    use super::*;
    use crate::presentation::dto::{AccountResponse, ListQuery, RegisterRequest};

    #[test]
    fn test_account_response_serialization() {
        let account = account_with_role("ada@example.com", AccountRole::Normal);
        let response = AccountResponse::from(&account);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accountId"));
        assert!(json.contains("firstName"));
        assert!(json.contains("emailVerified"));
        assert!(json.contains("dateJoined"));
        assert!(json.contains(r#""role":"normal""#));
        // Secrets never leave the crate
        assert!(!json.contains("password"));
        assert!(!json.contains("verificationToken"));
    }

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","password":"plenty long password"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.first_name, "Ada");
        assert_eq!(request.last_name, "Lovelace");
        assert_eq!(request.email, "ada@example.com");
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 20);
    }
}
