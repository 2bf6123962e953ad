//! PostgreSQL Repository Implementation
//!
//! Single-statement row-level writes give the per-account serialization
//! the account operations rely on; the unique index on `email` is the
//! authoritative race-breaker for duplicate addresses.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use platform::password::HashedPassword;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole, email::Email, person_name::PersonName,
};
use crate::error::{IdentityError, IdentityResult};
use kernel::id::AccountId;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Duplicate email commits surface as `EmailTaken`, even when an earlier
/// read-time check passed.
fn map_write_error(err: sqlx::Error) -> IdentityError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return IdentityError::EmailTaken;
        }
    }
    IdentityError::Database(err)
}

impl AccountRepository for PgAccountRepository {
    async fn insert(&self, account: &Account) -> IdentityResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                first_name,
                last_name,
                email,
                password_hash,
                active,
                email_verified,
                account_role,
                verification_token,
                verification_expires_at,
                profile_image_url,
                date_joined,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.first_name.as_str())
        .bind(account.last_name.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.active)
        .bind(account.email_verified)
        .bind(account.role.id())
        .bind(&account.verification_token)
        .bind(account.verification_expires_at)
        .bind(&account.profile_image_url)
        .bind(account.date_joined)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                first_name,
                last_name,
                email,
                password_hash,
                active,
                email_verified,
                account_role,
                verification_token,
                verification_expires_at,
                profile_image_url,
                date_joined,
                updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                first_name,
                last_name,
                email,
                password_hash,
                active,
                email_verified,
                account_role,
                verification_token,
                verification_expires_at,
                profile_image_url,
                date_joined,
                updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn update(&self, account: &Account) -> IdentityResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                first_name = $2,
                last_name = $3,
                email = $4,
                password_hash = $5,
                active = $6,
                email_verified = $7,
                account_role = $8,
                verification_token = $9,
                verification_expires_at = $10,
                profile_image_url = $11,
                updated_at = $12
            WHERE account_id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.first_name.as_str())
        .bind(account.last_name.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.active)
        .bind(account.email_verified)
        .bind(account.role.id())
        .bind(&account.verification_token)
        .bind(account.verification_expires_at)
        .bind(&account.profile_image_url)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::AccountNotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> IdentityResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::AccountNotFound);
        }

        Ok(())
    }

    async fn list(&self, page: u32, page_size: u32) -> IdentityResult<(Vec<Account>, u64)> {
        let offset = (page.saturating_sub(1) as i64) * page_size as i64;

        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                first_name,
                last_name,
                email,
                password_hash,
                active,
                email_verified,
                account_role,
                verification_token,
                verification_expires_at,
                profile_image_url,
                date_joined,
                updated_at
            FROM accounts
            ORDER BY date_joined DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        let accounts = rows
            .into_iter()
            .map(|r| r.into_account())
            .collect::<IdentityResult<Vec<_>>>()?;

        Ok((accounts, total as u64))
    }
}

// ============================================================================
// Row mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    active: bool,
    email_verified: bool,
    account_role: i16,
    verification_token: Option<String>,
    verification_expires_at: Option<DateTime<Utc>>,
    profile_image_url: Option<String>,
    date_joined: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> IdentityResult<Account> {
        let role = AccountRole::from_id(self.account_role).ok_or_else(|| {
            IdentityError::Internal(format!("Invalid role id: {}", self.account_role))
        })?;

        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| IdentityError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Account {
            id: AccountId::from_uuid(self.account_id),
            first_name: PersonName::from_db(self.first_name),
            last_name: PersonName::from_db(self.last_name),
            email: Email::from_db(self.email),
            password_hash,
            active: self.active,
            email_verified: self.email_verified,
            role,
            verification_token: self.verification_token,
            verification_expires_at: self.verification_expires_at,
            profile_image_url: self.profile_image_url,
            date_joined: self.date_joined,
            updated_at: self.updated_at,
        })
    }
}
