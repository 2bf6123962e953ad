//! Caller Identity Extraction
//!
//! The gateway authenticates callers and attaches their identity as
//! trusted headers; this extractor only parses them. No token validation
//! happens in this service.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::domain::value_object::account_role::AccountRole;
use crate::error::IdentityError;
use kernel::id::AccountId;

/// Header carrying the authenticated caller's account id
pub const CALLER_ID_HEADER: &str = "x-account-id";

/// Header carrying the authenticated caller's role code
pub const CALLER_ROLE_HEADER: &str = "x-account-role";

/// Authenticated caller, as asserted by the gateway
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    pub account_id: AccountId,
    pub role: AccountRole,
}

/// Parse the gateway identity headers
pub fn extract_caller(headers: &HeaderMap) -> Result<CallerIdentity, IdentityError> {
    let id_value = headers
        .get(CALLER_ID_HEADER)
        .ok_or_else(|| IdentityError::MissingHeader(CALLER_ID_HEADER.to_string()))?
        .to_str()
        .map_err(|_| IdentityError::Validation("Malformed caller id header".to_string()))?;

    let account_id = Uuid::parse_str(id_value)
        .map(AccountId::from_uuid)
        .map_err(|_| IdentityError::Validation("Malformed caller id header".to_string()))?;

    let role_value = headers
        .get(CALLER_ROLE_HEADER)
        .ok_or_else(|| IdentityError::MissingHeader(CALLER_ROLE_HEADER.to_string()))?
        .to_str()
        .map_err(|_| IdentityError::Validation("Malformed caller role header".to_string()))?;

    let role = AccountRole::from_code(role_value)
        .ok_or_else(|| IdentityError::Validation("Unknown caller role".to_string()))?;

    Ok(CallerIdentity { account_id, role })
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_caller(&parts.headers)
    }
}
