//! PostgreSQL Repository Implementations

use chrono::{DateTime, Duration, Utc};
use kernel::id::AccountId;
use sqlx::PgPool;

use crate::domain::entity::account::{Account, LockoutState, NewAccount};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    credential::Credential, display_name::DisplayName, email::Email,
};
use crate::error::{AuthError, AuthResult};

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

impl AccountRepository for PgAccountRepository {
    async fn create(&self, new_account: &NewAccount) -> AuthResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (
                email,
                display_name,
                password_hash
            ) VALUES ($1, $2, $3)
            RETURNING
                account_id,
                email,
                display_name,
                password_hash,
                failed_login_count,
                locked_until,
                created_at,
                updated_at
            "#,
        )
        .bind(new_account.email.as_str())
        .bind(new_account.display_name.as_str())
        .bind(new_account.password_hash.as_phc_string())
        .fetch_one(&self.pool)
        .await?;

        row.into_account()
    }

    async fn find_by_id(&self, account_id: AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                display_name,
                password_hash,
                failed_login_count,
                locked_until,
                created_at,
                updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                display_name,
                password_hash,
                failed_login_count,
                locked_until,
                created_at,
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

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update_password(&self, account_id: AccountId, hash: &Credential) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                password_hash = $2,
                updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_i64())
        .bind(hash.as_phc_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }

        Ok(())
    }

    async fn record_failure(
        &self,
        account_id: AccountId,
        threshold: u16,
        lock_duration: Duration,
    ) -> AuthResult<LockoutState> {
        // Increment-and-maybe-lock in a single statement. Two concurrent
        // attempts serialize on the row lock, so the counter never loses
        // an increment and only the attempt that crosses the threshold
        // (while no lock is active) arms the lock.
        let row = sqlx::query_as::<_, (i16, Option<DateTime<Utc>>)>(
            r#"
            UPDATE accounts SET
                failed_login_count = failed_login_count + 1,
                locked_until = CASE
                    WHEN failed_login_count + 1 >= $2
                         AND (locked_until IS NULL OR locked_until <= now())
                    THEN now() + make_interval(secs => $3)
                    ELSE locked_until
                END,
                updated_at = now()
            WHERE account_id = $1
            RETURNING failed_login_count, locked_until
            "#,
        )
        .bind(account_id.as_i64())
        .bind(threshold as i32)
        .bind(lock_duration.num_seconds() as f64)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

        Ok(LockoutState {
            failed_count: row.0 as u16,
            locked_until: row.1,
        })
    }

    async fn clear_failures(&self, account_id: AccountId) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                failed_login_count = 0,
                locked_until = NULL,
                updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: i64,
    email: String,
    display_name: String,
    password_hash: String,
    failed_login_count: i16,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let password_hash = Credential::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Corrupt stored hash: {e}")))?;

        Ok(Account {
            account_id: AccountId::from_raw(self.account_id),
            email: Email::from_db(self.email),
            display_name: DisplayName::from_db(self.display_name),
            password_hash,
            failed_login_count: self.failed_login_count.max(0) as u16,
            locked_until: self.locked_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
