//! Domain Services
//!
//! Pure generation helpers for verification secrets.

use platform::crypto::{random_bytes, to_base64_url};
use rand::Rng;

/// Byte length of verification tokens before encoding
pub const VERIFICATION_TOKEN_BYTES: usize = 32;

/// Number of digits in an email change code
pub const CHANGE_CODE_DIGITS: usize = 6;

/// Generate an opaque, unguessable account verification token
pub fn generate_verification_token() -> String {
    to_base64_url(&random_bytes(VERIFICATION_TOKEN_BYTES))
}

/// Generate a uniform random 6-digit email change code
///
/// Codes are not unique across accounts; each is scoped to one pending
/// change and compared by exact string equality.
pub fn generate_change_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:0width$}", n, width = CHANGE_CODE_DIGITS)
}
