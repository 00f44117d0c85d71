//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::application::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Email address already registered
    #[error("Email address already registered")]
    EmailTaken,

    /// Invalid credentials (wrong password or unknown account)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked")]
    AccountLocked {
        /// Seconds until the lock expires
        retry_after_secs: i64,
    },

    /// Access or refresh token past its expiry instant
    #[error("Token has expired")]
    TokenExpired,

    /// Token failed signature or structural verification
    #[error("Token is invalid")]
    TokenInvalid,

    /// No token supplied on a guarded route
    #[error("Missing access token")]
    MissingToken,

    /// Input validation error (email, display name)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked { .. } => StatusCode::LOCKED,
            AuthError::TokenExpired | AuthError::TokenInvalid | AuthError::MissingToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Validation(_) | AuthError::PasswordValidation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::MissingToken => ErrorKind::Unauthorized,
            AuthError::AccountLocked { .. } => ErrorKind::Locked,
            AuthError::Validation(_) | AuthError::PasswordValidation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) => ErrorKind::ServiceUnavailable,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Token failures carry distinct actions so clients can tell
    /// "refresh the session" apart from "sign in again".
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::TokenExpired => AppError::new(self.kind(), self.to_string())
                .with_action("Use the refresh token to obtain a new access token"),
            AuthError::TokenInvalid | AuthError::MissingToken => {
                AppError::new(self.kind(), self.to_string()).with_action("Sign in again")
            }
            AuthError::AccountLocked { retry_after_secs } => {
                AppError::new(self.kind(), self.to_string())
                    .with_action(format!("Retry after {} seconds", retry_after_secs))
            }
            AuthError::Database(_) => {
                // Never forward driver details to the caller
                AppError::new(self.kind(), "Service temporarily unavailable")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Login attempt on locked account");
            }
            AuthError::TokenExpired | AuthError::TokenInvalid => {
                tracing::warn!(error = %self, "Token rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        // Locked accounts advertise the wait via the standard header
        if let AuthError::AccountLocked { retry_after_secs } = &self {
            let retry_after = retry_after_secs.to_string();
            return (
                [(axum::http::header::RETRY_AFTER, retry_after)],
                self.to_app_error(),
            )
                .into_response();
        }

        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
        }
    }
}
