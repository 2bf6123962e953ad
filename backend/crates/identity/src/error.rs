//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
///
/// Every rejection an account operation can produce has its own variant,
/// so the boundary layer can map each one to a precise response instead
/// of a generic failure.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Target account does not exist
    #[error("Account not found")]
    AccountNotFound,

    /// Email is already registered to another account
    #[error("Email already registered")]
    EmailTaken,

    /// Requested email change to the address already on the account
    #[error("New email is the same as the current email")]
    SameEmail,

    /// Email is already verified; nothing to do
    #[error("Email already verified")]
    AlreadyVerified,

    /// Verification token missing or does not match
    #[error("Invalid verification token")]
    InvalidToken,

    /// Verification token past its expiry
    #[error("Verification token expired")]
    TokenExpired,

    /// No email change is pending for this account
    #[error("No pending email change")]
    NoPendingChange,

    /// Email change code past its expiry
    #[error("Email change code expired")]
    CodeExpired,

    /// Supplied email does not match the pending change
    #[error("Email does not match the pending change")]
    EmailMismatch,

    /// Supplied code does not match the pending change
    #[error("Email change code does not match")]
    CodeMismatch,

    /// Caller must be an admin or higher
    #[error("Admin access required")]
    AdminRequired,

    /// Caller must be a super admin
    #[error("Super admin access required")]
    SuperAdminRequired,

    /// Target's role places it beyond the caller's authority
    #[error("Account is protected")]
    Protected,

    /// Target already holds a privileged role
    #[error("Account is already privileged")]
    AlreadyPrivileged,

    /// Demotion target is not an admin
    #[error("Account is not an admin")]
    NotAdmin,

    /// Missing required header (e.g., gateway identity headers)
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Malformed or out-of-bounds input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Outbound code delivery failed
    #[error("Notification delivery failed: {0}")]
    NotificationFailed(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::AccountNotFound | IdentityError::NoPendingChange => {
                StatusCode::NOT_FOUND
            }
            IdentityError::EmailTaken
            | IdentityError::AlreadyVerified
            | IdentityError::AlreadyPrivileged
            | IdentityError::NotAdmin
            | IdentityError::InvalidToken
            | IdentityError::EmailMismatch
            | IdentityError::CodeMismatch => StatusCode::CONFLICT,
            IdentityError::TokenExpired | IdentityError::CodeExpired => StatusCode::GONE,
            IdentityError::AdminRequired
            | IdentityError::SuperAdminRequired
            | IdentityError::Protected => StatusCode::FORBIDDEN,
            IdentityError::SameEmail
            | IdentityError::MissingHeader(_)
            | IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentityError::NotificationFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::AccountNotFound | IdentityError::NoPendingChange => ErrorKind::NotFound,
            IdentityError::EmailTaken
            | IdentityError::AlreadyVerified
            | IdentityError::AlreadyPrivileged
            | IdentityError::NotAdmin
            | IdentityError::InvalidToken
            | IdentityError::EmailMismatch
            | IdentityError::CodeMismatch => ErrorKind::Conflict,
            IdentityError::TokenExpired | IdentityError::CodeExpired => ErrorKind::Gone,
            IdentityError::AdminRequired
            | IdentityError::SuperAdminRequired
            | IdentityError::Protected => ErrorKind::Forbidden,
            IdentityError::SameEmail
            | IdentityError::MissingHeader(_)
            | IdentityError::Validation(_) => ErrorKind::BadRequest,
            IdentityError::NotificationFailed(_) => ErrorKind::ServiceUnavailable,
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::NotificationFailed(msg) => {
                tracing::error!(message = %msg, "Change code delivery failed");
            }
            IdentityError::InvalidToken | IdentityError::CodeMismatch => {
                tracing::warn!(error = %self, "Verification secret mismatch");
            }
            IdentityError::Protected
            | IdentityError::AdminRequired
            | IdentityError::SuperAdminRequired => {
                tracing::warn!(error = %self, "Moderation guard rejected caller");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => IdentityError::Validation(err.message().to_string()),
            ErrorKind::NotFound => IdentityError::AccountNotFound,
            _ => IdentityError::Internal(err.to_string()),
        }
    }
}
