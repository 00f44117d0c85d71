//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Account entity, lockout state machine, repository traits
//! - `application/` - Use cases, token service, configuration
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Account registration with email + password
//! - Login with per-account failure tracking and temporary lockout
//! - Signed access/refresh token pairs (HMAC-SHA256)
//! - Password change that invalidates outstanding refresh tokens
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Lockout after repeated failures; the counter is updated atomically
//!   at the persistence layer, never read-modify-write in the guard
//! - Refresh token keys derived from the current password hash, so a
//!   password change cuts off every issued refresh token
//! - Lock state is re-read from the durable store on every attempt

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token::TokenService;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAccountRepository;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
