//! Register Use Case
//!
//! Creates a new account.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::NewAccount;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    credential::{Credential, RawPassword},
    display_name::DisplayName,
    email::Email,
};
use crate::error::{AuthError, AuthResult};
use kernel::id::AccountId;

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub account_id: AccountId,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let email =
            Email::new(input.email).map_err(|e| AuthError::Validation(e.message().to_string()))?;
        let display_name = DisplayName::new(input.display_name)
            .map_err(|e| AuthError::Validation(e.message().to_string()))?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password = RawPassword::new(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;
        let password_hash = Credential::from_raw(&password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let account = self
            .repo
            .create(&NewAccount {
                email,
                display_name,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.account_id, "Account registered");

        Ok(RegisterOutput {
            account_id: account.account_id,
        })
    }
}
