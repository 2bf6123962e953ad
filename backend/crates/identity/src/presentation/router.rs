//! Identity Router

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::repository::{AccountRepository, ChangeCodeNotifier, PendingChangeStore};
use crate::infra::memory::InMemoryPendingChangeStore;
use crate::infra::notify::TracingChangeCodeNotifier;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, IdentityAppState};

/// Create the identity router with the default adapters: Postgres-backed
/// accounts, process-local pending changes, logging notifier.
pub fn identity_router(repo: PgAccountRepository, config: IdentityConfig) -> Router {
    identity_router_generic(
        repo,
        InMemoryPendingChangeStore::new(),
        TracingChangeCodeNotifier::new(),
        config,
    )
}

/// Create an identity router for any adapter combination
pub fn identity_router_generic<R, P, N>(
    repo: R,
    pending: P,
    notifier: N,
    config: IdentityConfig,
) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let state = IdentityAppState {
        repo: Arc::new(repo),
        pending: Arc::new(pending),
        notifier: Arc::new(notifier),
        config: Arc::new(config),
    };

    // Internal routes: service-to-service, behind the gateway boundary
    let internal = Router::new()
        .route("/", post(handlers::register::<R, P, N>))
        .route("/email", get(handlers::get_account_by_email::<R, P, N>))
        .route("/{id}", get(handlers::get_account::<R, P, N>))
        .route(
            "/{id}/verification-token",
            post(handlers::issue_verification_token::<R, P, N>),
        )
        .route("/{id}/verify", put(handlers::verify_email::<R, P, N>));

    // External routes: caller identity headers required
    let external = Router::new()
        .route("/", get(handlers::list_accounts::<R, P, N>))
        .route("/me", get(handlers::current_account::<R, P, N>))
        .route(
            "/{id}/profile",
            get(handlers::get_profile::<R, P, N>).put(handlers::update_profile::<R, P, N>),
        )
        .route("/{id}/status", put(handlers::update_status::<R, P, N>))
        .route("/{id}/role", put(handlers::update_role::<R, P, N>))
        .route("/{id}", delete(handlers::delete_account::<R, P, N>))
        .route(
            "/{id}/email-change",
            post(handlers::request_email_change::<R, P, N>),
        )
        .route(
            "/{id}/email-change/confirm",
            post(handlers::confirm_email_change::<R, P, N>),
        );

    Router::new()
        .nest("/internal/accounts", internal)
        .nest("/api/accounts", external)
        .with_state(state)
}
