//! Application Configuration
//!
//! Configuration for the Auth application layer. All secrets are
//! constructor parameters; nothing here reads process-wide state, so
//! tests can run with deterministic throwaway values.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret signing access tokens (32 bytes)
    pub access_token_secret: [u8; 32],
    /// Secret from which per-account refresh keys are derived (32 bytes)
    pub refresh_token_secret: [u8; 32],
    /// Access token TTL (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token TTL (7 days)
    pub refresh_token_ttl: Duration,
    /// Failed attempts before a temporary lockout
    pub lockout_threshold: u16,
    /// How long a lockout holds (2 hours)
    pub lockout_duration: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: [0u8; 32],
            refresh_token_secret: [0u8; 32],
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 7 days
            lockout_threshold: 5,
            lockout_duration: Duration::from_secs(2 * 3600), // 2 hours
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets (for development)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut access = [0u8; 32];
        let mut refresh = [0u8; 32];
        rand::rng().fill_bytes(&mut access);
        rand::rng().fill_bytes(&mut refresh);
        Self {
            access_token_secret: access,
            refresh_token_secret: refresh,
            ..Default::default()
        }
    }

    /// Lockout duration as a chrono duration for timestamp arithmetic
    pub fn lockout_duration_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.lockout_duration)
            .unwrap_or_else(|_| chrono::Duration::hours(2))
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
