//! Sign In Use Case
//!
//! The authentication guard: verifies a credential against the stored
//! hash, drives the lockout state machine, and issues the session token
//! pair on success.
//!
//! Lock state is re-read from the durable store on every attempt and the
//! counter is updated through the repository's atomic `record_failure`,
//! so concurrent attempts against one account cannot lose updates or
//! double-trigger the lock.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::{TokenPair, TokenService};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    credential::{Credential, RawPassword},
    email::Email,
};
use crate::error::{AuthError, AuthResult};
use kernel::id::AccountId;

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub account_id: AccountId,
    pub tokens: TokenPair,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R> SignInUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        // Malformed input never reaches the store and is never recorded
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;
        let password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let account = match self.repo.find_by_email(&email).await? {
            Some(account) => account,
            None => {
                // Burn a verification so an unknown email costs the same
                // as a wrong password
                let _ = Credential::dummy().verify(&password, self.config.pepper());
                return Err(AuthError::InvalidCredentials);
            }
        };

        // An attempt against a locked account is still recorded
        if let Some(remaining) = account.lock_remaining() {
            self.repo
                .record_failure(
                    account.account_id,
                    self.config.lockout_threshold,
                    self.config.lockout_duration_chrono(),
                )
                .await?;

            return Err(AuthError::AccountLocked {
                retry_after_secs: remaining.num_seconds().max(1),
            });
        }

        if !account.password_hash.verify(&password, self.config.pepper()) {
            let state = self
                .repo
                .record_failure(
                    account.account_id,
                    self.config.lockout_threshold,
                    self.config.lockout_duration_chrono(),
                )
                .await?;

            if state.is_locked_at(chrono::Utc::now()) {
                tracing::warn!(
                    account_id = %account.account_id,
                    failed_count = state.failed_count,
                    "Account locked after repeated failures"
                );
            }

            return Err(AuthError::InvalidCredentials);
        }

        // Success while unlocked resets the counter and clears any stale lock
        self.repo.clear_failures(account.account_id).await?;

        let tokens = self
            .tokens
            .issue(account.account_id, account.password_hash.as_phc_string());

        tracing::info!(account_id = %account.account_id, "Account signed in");

        Ok(SignInOutput {
            account_id: account.account_id,
            tokens,
        })
    }
}
