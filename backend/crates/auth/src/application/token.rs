//! Token Service
//!
//! Issues and verifies the signed tokens representing an authenticated
//! session. A token is `base64url(claims).base64url(signature)` where the
//! signature is HMAC-SHA256 over the encoded claims.
//!
//! Two flavors, told apart only by which key verifies them:
//! - **access**: signed with the service-wide access secret, short TTL
//! - **refresh**: signed with a per-account key derived from the refresh
//!   secret and the account's current password hash, long TTL - so a
//!   password change invalidates every outstanding refresh token while
//!   already-issued access tokens run to their natural expiry
//!
//! Verification is pure: no persistence access here. The refresh use case
//! supplies the account's current hash after re-fetching the record.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::application::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Token verification failures
///
/// Distinct on purpose: `Expired` invites a refresh attempt, `Invalid`
/// forces a fresh sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Well-formed and authentic, but past its expiry instant
    #[error("token has expired")]
    Expired,

    /// Malformed, tampered with, or signed with the wrong key
    #[error("token is invalid")]
    Invalid,
}

/// An access/refresh pair issued on successful authentication
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signed claims carried by both token flavors
///
/// No flavor field: which secret verifies the signature decides what the
/// token is.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Internal account key
    sub: i64,
    /// Issued-at (Unix seconds)
    iat: i64,
    /// Expires-at (Unix seconds)
    exp: i64,
}

/// Issues and verifies session tokens
pub struct TokenService {
    access_secret: [u8; 32],
    refresh_secret: [u8; 32],
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_secret: config.access_token_secret,
            refresh_secret: config.refresh_token_secret,
            access_ttl_secs: config.access_token_ttl.as_secs() as i64,
            refresh_ttl_secs: config.refresh_token_ttl.as_secs() as i64,
        }
    }

    /// Issue a fresh access/refresh pair for an authenticated account
    ///
    /// `password_hash` is the account's current PHC string; it seeds the
    /// refresh key derivation.
    pub fn issue(&self, account_id: AccountId, password_hash: &str) -> TokenPair {
        let now = Utc::now().timestamp();

        let access_token = sign(
            &self.access_secret,
            &Claims {
                sub: account_id.as_i64(),
                iat: now,
                exp: now + self.access_ttl_secs,
            },
        );

        let refresh_token = sign(
            &self.refresh_key(password_hash),
            &Claims {
                sub: account_id.as_i64(),
                iat: now,
                exp: now + self.refresh_ttl_secs,
            },
        );

        TokenPair {
            access_token,
            refresh_token,
        }
    }

    /// Verify an access token, yielding the account it references
    ///
    /// Signature and expiry only; never consults the persistence layer.
    pub fn verify_access(&self, token: &str) -> Result<AccountId, TokenError> {
        let claims = verify(&self.access_secret, token, Utc::now().timestamp())?;
        Ok(AccountId::from_raw(claims.sub))
    }

    /// Verify a refresh token against the account's *current* hash
    ///
    /// The caller re-fetches the account first, which both confirms it
    /// still exists and binds validity to the present password.
    pub fn verify_refresh(
        &self,
        token: &str,
        current_password_hash: &str,
    ) -> Result<AccountId, TokenError> {
        let key = self.refresh_key(current_password_hash);
        let claims = verify(&key, token, Utc::now().timestamp())?;
        Ok(AccountId::from_raw(claims.sub))
    }

    /// Read the account reference from a token without verifying it
    ///
    /// Needed to locate the per-account refresh key before the real
    /// verification; the result is untrusted until `verify_refresh`
    /// passes with that account's hash.
    pub fn peek_account(&self, token: &str) -> Result<AccountId, TokenError> {
        let payload = token.split('.').next().ok_or(TokenError::Invalid)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| TokenError::Invalid)?;
        Ok(AccountId::from_raw(claims.sub))
    }

    /// Per-account refresh signing key
    fn refresh_key(&self, password_hash: &str) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(&self.refresh_secret)
            .expect("HMAC can take key of any size");
        mac.update(password_hash.as_bytes());
        mac.finalize().into_bytes().into()
    }
}

// ============================================================================
// Signing primitives
// ============================================================================

fn sign(key: &[u8], claims: &Claims) -> String {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("claims serialize"));

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature))
}

fn verify(key: &[u8], token: &str, now: i64) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(TokenError::Invalid);
    }

    let payload = parts[0];
    let signature = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| TokenError::Invalid)?;

    // Signature is verified before any claim is parsed or trusted
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::Invalid)?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Invalid)?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| TokenError::Invalid)?;

    if claims.iat > now {
        return Err(TokenError::Invalid);
    }
    if claims.exp <= now {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    const HASH_A: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0c2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const HASH_B: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0c2FsdA$BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn service() -> TokenService {
        let config = AuthConfig {
            access_token_secret: [1u8; 32],
            refresh_token_secret: [2u8; 32],
            ..Default::default()
        };
        TokenService::new(&config)
    }

    #[test]
    fn test_access_roundtrip() {
        let service = service();
        let pair = service.issue(Id::from_raw(42), HASH_A);

        let account = service.verify_access(&pair.access_token).unwrap();
        assert_eq!(account.as_i64(), 42);
    }

    #[test]
    fn test_refresh_roundtrip() {
        let service = service();
        let pair = service.issue(Id::from_raw(42), HASH_A);

        let account = service.verify_refresh(&pair.refresh_token, HASH_A).unwrap();
        assert_eq!(account.as_i64(), 42);
    }

    #[test]
    fn test_flavors_do_not_cross_verify() {
        // Distinguished by key, not by claim - each flavor fails the
        // other verifier
        let service = service();
        let pair = service.issue(Id::from_raw(42), HASH_A);

        assert_eq!(
            service.verify_access(&pair.refresh_token),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            service.verify_refresh(&pair.access_token, HASH_A),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_password_change_invalidates_refresh() {
        let service = service();
        let pair = service.issue(Id::from_raw(42), HASH_A);

        assert_eq!(
            service.verify_refresh(&pair.refresh_token, HASH_B),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let now = Utc::now().timestamp();
        let token = sign(
            &service.access_secret,
            &Claims {
                sub: 42,
                iat: now - 600,
                exp: now - 1,
            },
        );

        assert_eq!(service.verify_access(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_future_issued_at_is_invalid() {
        let service = service();
        let now = Utc::now().timestamp();
        let token = sign(
            &service.access_secret,
            &Claims {
                sub: 42,
                iat: now + 600,
                exp: now + 1200,
            },
        );

        assert_eq!(service.verify_access(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = service();
        let pair = service.issue(Id::from_raw(42), HASH_A);

        let (_, signature) = pair.access_token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                sub: 1,
                iat: 0,
                exp: i64::MAX,
            })
            .unwrap(),
        );
        let forged = format!("{}.{}", forged_payload, signature);

        assert_eq!(service.verify_access(&forged), Err(TokenError::Invalid));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let service = service();
        for garbage in ["", "a", "a.b", "a.b.c", "!!!.###"] {
            assert_eq!(
                service.verify_access(garbage),
                Err(TokenError::Invalid),
                "token {garbage:?}"
            );
        }
    }

    #[test]
    fn test_distinct_secrets_reject() {
        let service = service();
        let other = TokenService::new(&AuthConfig {
            access_token_secret: [9u8; 32],
            refresh_token_secret: [2u8; 32],
            ..Default::default()
        });

        let pair = service.issue(Id::from_raw(42), HASH_A);
        assert_eq!(
            other.verify_access(&pair.access_token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_peek_account_reads_unverified_sub() {
        let service = service();
        let pair = service.issue(Id::from_raw(42), HASH_A);

        assert_eq!(
            service.peek_account(&pair.refresh_token).unwrap().as_i64(),
            42
        );
        assert_eq!(service.peek_account("garbage"), Err(TokenError::Invalid));
    }
}
