//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::Duration;
use kernel::id::AccountId;

use crate::domain::entity::account::{Account, LockoutState, NewAccount};
use crate::domain::value_object::{credential::Credential, email::Email};
use crate::error::AuthResult;

/// Account repository trait
///
/// The lockout counter/lock pair is the only shared mutable state in this
/// core, so the contract is explicit about atomicity: `record_failure`
/// must apply increment-and-maybe-lock as a single durable operation.
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Create a new account; the store assigns the internal key
    async fn create(&self, new_account: &NewAccount) -> AuthResult<Account>;

    /// Find account by internal key
    async fn find_by_id(&self, account_id: AccountId) -> AuthResult<Option<Account>>;

    /// Find account by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Replace the password hash
    async fn update_password(&self, account_id: AccountId, hash: &Credential) -> AuthResult<()>;

    /// Record a failed login attempt
    ///
    /// Atomic: increments the counter and, when the incremented counter
    /// crosses `threshold` while no lock is active, sets the lock to
    /// now + `lock_duration` - all in one durable operation. Returns the
    /// post-update state.
    async fn record_failure(
        &self,
        account_id: AccountId,
        threshold: u16,
        lock_duration: Duration,
    ) -> AuthResult<LockoutState>;

    /// Reset the counter and lock after a successful unlocked login
    async fn clear_failures(&self, account_id: AccountId) -> AuthResult<()>;
}
