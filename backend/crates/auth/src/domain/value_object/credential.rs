//! Credential Value Object
//!
//! Domain value object for account passwords. Delegates to
//! `platform::password` for the cryptographic operations.
//!
//! ## Security Features
//! - Argon2id hashing (memory-hard)
//! - Automatic memory zeroization of clear text
//! - Constant-time comparison
//! - Unicode NFKC normalization
//!
//! The refresh-token key derivation reads the stored PHC string through
//! [`Credential::as_phc_string`]; that is the binding that makes a
//! password change cut off outstanding refresh tokens.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Wrapper around `ClearTextPassword` with domain-specific error handling.
/// Memory is automatically zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password with validation
    ///
    /// ## Validation Rules (NIST SP 800-63B)
    /// - Minimum 8 characters
    /// - Maximum 128 characters
    /// - No control characters
    /// - Unicode NFKC normalized
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, actual } => AppError::bad_request(format!(
                "Password must be at least {} characters (got {})",
                min, actual
            ))
            .with_action("Please choose a longer password"),

            PasswordPolicyError::TooLong { max, actual } => AppError::bad_request(format!(
                "Password must be at most {} characters (got {})",
                max, actual
            ))
            .with_action("Please choose a shorter password"),

            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password cannot be empty")
                    .with_action("Please enter a password")
            }

            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
                    .with_action("Please remove any special control characters")
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Access the inner ClearTextPassword
    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Credential (Stored Hash)
// ============================================================================

/// Stored password hash in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(HashedPassword);

impl Credential {
    /// Hash a raw password for storage
    ///
    /// ## Arguments
    /// * `pepper` - Optional application-wide secret
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        let hashed = raw
            .inner()
            .hash(pepper)
            .map_err(|e| AppError::internal(e.to_string()))?;
        Ok(Self(hashed))
    }

    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(s).map(Self)
    }

    /// Get the PHC string for storage and key derivation
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash (constant-time)
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    /// Verification target for unknown accounts
    ///
    /// Burning a real Argon2id verification against this fixed hash keeps
    /// rejection timing uniform whether or not the email exists.
    pub fn dummy() -> Self {
        const DUMMY_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";
        Self::from_phc_string(DUMMY_PHC).expect("static PHC string is valid")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[HASH]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("CorrectHorse42!".to_string()).unwrap();
        let credential = Credential::from_raw(&raw, None).unwrap();

        assert!(credential.verify(&raw, None));

        let wrong = RawPassword::new("WrongHorse42!".to_string()).unwrap();
        assert!(!credential.verify(&wrong, None));
    }

    #[test]
    fn test_pepper_changes_verification() {
        let raw = RawPassword::new("CorrectHorse42!".to_string()).unwrap();
        let credential = Credential::from_raw(&raw, Some(b"pepper")).unwrap();

        assert!(credential.verify(&raw, Some(b"pepper")));
        assert!(!credential.verify(&raw, None));
    }

    #[test]
    fn test_policy_errors_surface_as_bad_request() {
        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_phc_roundtrip() {
        let raw = RawPassword::new("CorrectHorse42!".to_string()).unwrap();
        let credential = Credential::from_raw(&raw, None).unwrap();

        let restored = Credential::from_phc_string(credential.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, None));
    }

    #[test]
    fn test_dummy_rejects_anything() {
        let raw = RawPassword::new("CorrectHorse42!".to_string()).unwrap();
        assert!(!Credential::dummy().verify(&raw, None));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("CorrectHorse42!".to_string()).unwrap();
        let credential = Credential::from_raw(&raw, None).unwrap();

        assert!(!format!("{:?}", raw).contains("Horse"));
        assert!(!format!("{:?}", credential).contains("argon2id"));
    }
}
