//! Auth Middleware
//!
//! Middleware for requiring a valid access token on protected routes.

use axum::body::Body;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::id::AccountId;
use std::sync::Arc;

use crate::application::token::TokenService;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct TokenMiddlewareState {
    pub tokens: Arc<TokenService>,
}

/// The authenticated account, stored in request extensions
#[derive(Debug, Clone, Copy)]
pub struct Principal(pub AccountId);

/// Middleware that requires a valid access token
///
/// Extracts the Bearer token, verifies signature and expiry (no
/// persistence round trip), and exposes the account to downstream
/// handlers as a [`Principal`] extension.
pub async fn require_access_token(
    state: TokenMiddlewareState,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = match extract_bearer(req.headers()) {
        Some(token) => token,
        None => return Err(AuthError::MissingToken.into_response()),
    };

    match state.tokens.verify_access(&token) {
        Ok(account_id) => {
            req.extensions_mut().insert(Principal(account_id));
            Ok(next.run(req).await)
        }
        Err(e) => Err(AuthError::from(e).into_response()),
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn test_extract_bearer_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }
}
