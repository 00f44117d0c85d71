//! Change Password Use Case
//!
//! Replaces the stored hash after re-verifying the current password.
//! Because refresh keys are derived from the hash, every outstanding
//! refresh token dies with the old password; already-issued access
//! tokens run to their natural expiry (deliberate upstream choice).

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::credential::{Credential, RawPassword};
use crate::error::{AuthError, AuthResult};
use kernel::id::AccountId;

/// Change password input
pub struct ChangePasswordInput {
    pub account_id: AccountId,
    pub current_password: String,
    pub new_password: String,
}

/// Change password use case
pub struct ChangePasswordUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ChangePasswordUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: ChangePasswordInput) -> AuthResult<()> {
        let account = self
            .repo
            .find_by_id(input.account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let current = RawPassword::new(input.current_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !account.password_hash.verify(&current, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let new_password = RawPassword::new(input.new_password)
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;
        let new_hash = Credential::from_raw(&new_password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.repo
            .update_password(account.account_id, &new_hash)
            .await?;

        tracing::info!(
            account_id = %account.account_id,
            "Password changed; outstanding refresh tokens are now invalid"
        );

        Ok(())
    }
}
