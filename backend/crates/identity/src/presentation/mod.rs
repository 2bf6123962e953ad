//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and caller identity extraction.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::IdentityAppState;
pub use middleware::{CALLER_ID_HEADER, CALLER_ROLE_HEADER, CallerIdentity};
pub use router::{identity_router, identity_router_generic};
