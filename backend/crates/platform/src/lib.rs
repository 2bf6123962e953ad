//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG bytes, Base64, constant-time compare)
//! - Password hashing (Argon2id, NIST SP 800-63B length rules)
//!
//! No domain knowledge lives here.

pub mod crypto;
pub mod password;
