//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::account::Account;

// ============================================================================
// Account
// ============================================================================

/// Account as exposed to callers (password hash and token stay internal)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub email_verified: bool,
    pub role: String,
    pub profile_image_url: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            account_id: *account.id.as_uuid(),
            first_name: account.first_name.as_str().to_string(),
            last_name: account.last_name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            is_active: account.active,
            email_verified: account.email_verified,
            role: account.role.code().to_string(),
            profile_image_url: account.profile_image_url.clone(),
            date_joined: account.date_joined,
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// Register request (internal, called by the auth service)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Register response
///
/// Carries the verification token so the auth service can deliver it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub account: AccountResponse,
    pub verification_token: String,
}

// ============================================================================
// Verification
// ============================================================================

/// Verify email request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Verification token response (issue / re-read)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Email change
// ============================================================================

/// Email change request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeRequest {
    pub new_email: String,
}

/// Email change confirmation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeConfirmRequest {
    pub new_email: String,
    pub code: String,
}

// ============================================================================
// Profile / moderation
// ============================================================================

/// Update profile request; absent fields are untouched
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Ban/unban request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub is_active: bool,
}

/// Promote/demote request; the target role decides the operation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateRequest {
    pub role: String,
}

// ============================================================================
// Listing
// ============================================================================

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub pages: u64,
}

/// Paginated account listing response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListResponse {
    pub accounts: Vec<AccountResponse>,
    pub pagination: PaginationMeta,
}

/// Lookup-by-email query parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailQuery {
    pub email: String,
}

// ============================================================================
// Misc
// ============================================================================

/// Simple message response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}
