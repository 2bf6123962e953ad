//! Value Object Module

pub mod account_role;
pub mod email;
pub mod person_name;

// The account ID is the shared kernel's typed UUID wrapper
pub use kernel::id::AccountId;
