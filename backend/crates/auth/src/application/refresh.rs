//! Refresh Use Case
//!
//! Exchanges a refresh token for a fresh access/refresh pair.
//!
//! The account reference inside the token is read *unverified* first,
//! only to locate the per-account refresh key; the real verification
//! then runs against the account's current password hash. Re-fetching
//! the record confirms the account still exists and cuts off tokens
//! issued before a password change.

use std::sync::Arc;

use crate::application::token::{TokenPair, TokenService};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use kernel::id::AccountId;

/// Refresh input
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Refresh output
#[derive(Debug)]
pub struct RefreshOutput {
    pub account_id: AccountId,
    pub tokens: TokenPair,
}

/// Refresh use case
pub struct RefreshUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> RefreshUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, input: RefreshInput) -> AuthResult<RefreshOutput> {
        // Untrusted claim read, only to know whose key to derive
        let claimed_account = self.tokens.peek_account(&input.refresh_token)?;

        let account = self
            .repo
            .find_by_id(claimed_account)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let account_id = self
            .tokens
            .verify_refresh(&input.refresh_token, account.password_hash.as_phc_string())?;

        // Rotation: every exchange returns a brand-new pair
        let tokens = self
            .tokens
            .issue(account_id, account.password_hash.as_phc_string());

        tracing::debug!(account_id = %account_id, "Session refreshed");

        Ok(RefreshOutput { account_id, tokens })
    }
}
