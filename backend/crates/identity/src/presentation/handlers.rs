//! HTTP Handlers
//!
//! Thin adapters between the wire and the use cases. Internal routes are
//! trusted service-to-service calls behind the gateway; external routes
//! additionally carry the gateway's caller identity headers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::IdentityConfig;
use crate::application::{
    AccountQueryUseCase, EmailChangeUseCase, EmailVerificationUseCase, ModerationUseCase,
    RegisterInput, RegisterUseCase, UpdateProfileInput, UpdateProfileUseCase,
};
use crate::domain::repository::{AccountRepository, ChangeCodeNotifier, PendingChangeStore};
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    AccountListResponse, AccountResponse, EmailChangeConfirmRequest, EmailChangeRequest,
    EmailQuery, ListQuery, MessageResponse, PaginationMeta, RegisterRequest, RegisterResponse,
    RoleUpdateRequest, StatusUpdateRequest, UpdateProfileRequest, VerificationTokenResponse,
    VerifyEmailRequest,
};
use crate::presentation::middleware::CallerIdentity;
use kernel::id::AccountId;

/// Shared state for identity handlers
pub struct IdentityAppState<R, P, N>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub pending: Arc<P>,
    pub notifier: Arc<N>,
    pub config: Arc<IdentityConfig>,
}

impl<R, P, N> Clone for IdentityAppState<R, P, N>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            pending: self.pending.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

/// Owner may act on their own account; anyone else needs admin or higher
fn ensure_owner_or_admin(caller: &CallerIdentity, target: &Uuid) -> IdentityResult<()> {
    if caller.account_id.as_uuid() != target && !caller.role.is_admin_or_higher() {
        return Err(IdentityError::AdminRequired);
    }
    Ok(())
}

// ============================================================================
// Internal: registration and lookups (called by the auth service)
// ============================================================================

/// POST /internal/accounts
pub async fn register<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<(StatusCode, Json<RegisterResponse>)>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account: AccountResponse::from(&output.account),
            verification_token: output.verification_token,
        }),
    ))
}

/// GET /internal/accounts/{id}
pub async fn get_account<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    Path(id): Path<Uuid>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = AccountQueryUseCase::new(state.repo.clone(), state.config.clone());
    let account = use_case.by_id(&AccountId::from_uuid(id)).await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// GET /internal/accounts/email?email=
pub async fn get_account_by_email<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    Query(query): Query<EmailQuery>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = AccountQueryUseCase::new(state.repo.clone(), state.config.clone());
    let account = use_case.by_email(&query.email).await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// POST /internal/accounts/{id}/verification-token
///
/// Returns the outstanding token while it is still valid, otherwise
/// issues a fresh one (used for verification email resends).
pub async fn issue_verification_token<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    Path(id): Path<Uuid>,
) -> IdentityResult<Json<VerificationTokenResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let account_id = AccountId::from_uuid(id);
    let use_case = EmailVerificationUseCase::new(state.repo.clone(), state.config.clone());

    let (token, expires_at) = match use_case.valid_token(&account_id).await? {
        Some(current) => current,
        None => use_case.issue(&account_id).await?,
    };

    Ok(Json(VerificationTokenResponse { token, expires_at }))
}

/// PUT /internal/accounts/{id}/verify
pub async fn verify_email<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyEmailRequest>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = EmailVerificationUseCase::new(state.repo.clone(), state.config.clone());
    let account = use_case
        .confirm(&AccountId::from_uuid(id), &req.token)
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

// ============================================================================
// External: profile
// ============================================================================

/// GET /api/accounts/me
pub async fn current_account<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = AccountQueryUseCase::new(state.repo.clone(), state.config.clone());
    let account = use_case.by_id(&caller.account_id).await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// GET /api/accounts/{id}/profile
pub async fn get_profile<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    _caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = AccountQueryUseCase::new(state.repo.clone(), state.config.clone());
    let account = use_case.by_id(&AccountId::from_uuid(id)).await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// PUT /api/accounts/{id}/profile
pub async fn update_profile<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = UpdateProfileUseCase::new(state.repo.clone());

    let account = use_case
        .execute(
            &caller.account_id,
            caller.role,
            &AccountId::from_uuid(id),
            UpdateProfileInput {
                first_name: req.first_name,
                last_name: req.last_name,
                profile_image_url: req.profile_image_url,
            },
        )
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

// ============================================================================
// External: listing and moderation
// ============================================================================

/// GET /api/accounts (admin only)
pub async fn list_accounts<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
    Query(query): Query<ListQuery>,
) -> IdentityResult<Json<AccountListResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    if !caller.role.is_admin_or_higher() {
        return Err(IdentityError::AdminRequired);
    }

    let use_case = AccountQueryUseCase::new(state.repo.clone(), state.config.clone());
    let page = use_case.list(query.page, query.page_size).await?;

    let pages = page.total.div_ceil(page.page_size as u64);

    Ok(Json(AccountListResponse {
        accounts: page.items.iter().map(AccountResponse::from).collect(),
        pagination: PaginationMeta {
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            pages,
        },
    }))
}

/// PUT /api/accounts/{id}/status - ban or unban
pub async fn update_status<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = ModerationUseCase::new(state.repo.clone());
    let target_id = AccountId::from_uuid(id);

    let account = if req.is_active {
        use_case.unban(caller.role, &target_id).await?
    } else {
        use_case.ban(caller.role, &target_id).await?
    };

    Ok(Json(AccountResponse::from(&account)))
}

/// PUT /api/accounts/{id}/role - promote to admin or demote to normal
pub async fn update_role<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<RoleUpdateRequest>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = ModerationUseCase::new(state.repo.clone());
    let target_id = AccountId::from_uuid(id);

    let account = match req.role.as_str() {
        "admin" => use_case.promote(caller.role, &target_id).await?,
        "normal" => use_case.demote(caller.role, &target_id).await?,
        other => {
            return Err(IdentityError::Validation(format!(
                "Unsupported role transition: {}",
                other
            )));
        }
    };

    Ok(Json(AccountResponse::from(&account)))
}

/// DELETE /api/accounts/{id} (super admin only)
pub async fn delete_account<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    let use_case = ModerationUseCase::new(state.repo.clone());
    let account = use_case
        .delete(caller.role, &AccountId::from_uuid(id))
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

// ============================================================================
// External: email change
// ============================================================================

/// POST /api/accounts/{id}/email-change
pub async fn request_email_change<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<EmailChangeRequest>,
) -> IdentityResult<(StatusCode, Json<MessageResponse>)>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    ensure_owner_or_admin(&caller, &id)?;

    let use_case = EmailChangeUseCase::new(
        state.repo.clone(),
        state.pending.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    use_case
        .request(&AccountId::from_uuid(id), req.new_email)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Confirmation code sent to the new address".to_string(),
        }),
    ))
}

/// POST /api/accounts/{id}/email-change/confirm
pub async fn confirm_email_change<R, P, N>(
    State(state): State<IdentityAppState<R, P, N>>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<EmailChangeConfirmRequest>,
) -> IdentityResult<Json<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    P: PendingChangeStore + Send + Sync + 'static,
    N: ChangeCodeNotifier + Send + Sync + 'static,
{
    ensure_owner_or_admin(&caller, &id)?;

    let use_case = EmailChangeUseCase::new(
        state.repo.clone(),
        state.pending.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let account = use_case
        .confirm(&AccountId::from_uuid(id), req.new_email, &req.code)
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}
