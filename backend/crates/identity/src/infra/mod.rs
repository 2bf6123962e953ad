//! Infrastructure Layer
//!
//! Database implementations, in-memory stores, and notifier adapters.

pub mod memory;
pub mod notify;
pub mod postgres;

pub use memory::{InMemoryAccountRepository, InMemoryPendingChangeStore};
pub use notify::TracingChangeCodeNotifier;
pub use postgres::PgAccountRepository;
