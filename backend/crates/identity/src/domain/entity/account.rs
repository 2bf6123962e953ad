//! Account Entity
//!
//! The durable identity record. Mutators are pure state transitions;
//! persistence is the repository's job and happens after the fact.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::guards::{self, EmailChangePolicy};
use crate::domain::value_object::{
    account_role::AccountRole, email::Email, person_name::PersonName,
};
use kernel::id::AccountId;

/// Account entity
///
/// Invariant: `verification_token` and `verification_expires_at` are set
/// and cleared together, and a verified email never has a token pending.
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier, immutable
    pub id: AccountId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    /// Unique across all accounts (lowercased, so comparison is case-insensitive)
    pub email: Email,
    /// Argon2id PHC string, opaque to this crate
    pub password_hash: HashedPassword,
    /// `false` means suspended (banned); the record still exists
    pub active: bool,
    pub email_verified: bool,
    pub role: AccountRole,
    /// Present only while an account verification is outstanding
    pub verification_token: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub profile_image_url: Option<String>,
    /// Creation timestamp, immutable
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new, unverified account
    pub fn new(
        first_name: PersonName,
        last_name: PersonName,
        email: Email,
        password_hash: HashedPassword,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: AccountId::new(),
            first_name,
            last_name,
            email,
            password_hash,
            active: true,
            email_verified: false,
            role: AccountRole::default(),
            verification_token: None,
            verification_expires_at: None,
            profile_image_url: None,
            date_joined: now,
            updated_at: now,
        }
    }

    /// Install a verification token, replacing any prior one
    pub fn set_verification_token(&mut self, token: String, expires_at: DateTime<Utc>) {
        self.verification_token = Some(token);
        self.verification_expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// The outstanding token, only while its expiry is strictly in the future
    pub fn valid_verification_token(&self) -> Option<(&str, DateTime<Utc>)> {
        match (&self.verification_token, self.verification_expires_at) {
            (Some(token), Some(expires_at)) if Utc::now() < expires_at => {
                Some((token.as_str(), expires_at))
            }
            _ => None,
        }
    }

    /// Mark the current email as proven reachable
    ///
    /// Promotes `Unverified -> Normal` (privileged roles keep theirs) and
    /// clears the token fields.
    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
        self.role = guards::role_after_verification(self.role);
        self.verification_token = None;
        self.verification_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Replace the email address after a confirmed change
    ///
    /// The new address starts unverified; the role follows `policy`. Any
    /// token issued for the old address is dropped with it.
    pub fn apply_email_change(&mut self, new_email: Email, policy: EmailChangePolicy) {
        self.email = new_email;
        self.email_verified = false;
        self.role = guards::role_after_email_change(self.role, policy);
        self.verification_token = None;
        self.verification_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Suspend or reinstate the account. Role is untouched.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }

    /// Update account role
    pub fn set_role(&mut self, role: AccountRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Update name fields (only the ones supplied)
    pub fn set_name(&mut self, first: Option<PersonName>, last: Option<PersonName>) {
        if let Some(first) = first {
            self.first_name = first;
        }
        if let Some(last) = last {
            self.last_name = last;
        }
        self.updated_at = Utc::now();
    }

    /// Update profile image URL
    pub fn set_profile_image(&mut self, url: Option<String>) {
        self.profile_image_url = url;
        self.updated_at = Utc::now();
    }
}
