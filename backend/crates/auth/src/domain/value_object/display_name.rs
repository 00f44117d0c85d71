//! Display Name Value Object
//!
//! The name shown next to an account's reviews and annotations. Unlike a
//! login handle it carries no uniqueness requirement; validation only
//! keeps it renderable.
//!
//! ## Invariants
//! - 1 to 64 characters after NFKC normalization and trimming
//! - no control characters

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Maximum length for display names (in characters)
pub const DISPLAY_NAME_MAX_LENGTH: usize = 64;

/// Display name value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a new display name with validation
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let normalized: String = name.into().nfkc().collect();
        let trimmed = normalized.trim();

        if trimmed.is_empty() {
            return Err(AppError::bad_request("Display name cannot be empty"));
        }

        let char_count = trimmed.chars().count();
        if char_count > DISPLAY_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Display name must be at most {} characters (got {})",
                DISPLAY_NAME_MAX_LENGTH, char_count
            )));
        }

        if trimmed.chars().any(|c| c.is_control()) {
            return Err(AppError::bad_request(
                "Display name contains invalid control characters",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name() {
        let name = DisplayName::new("Ada Lovelace").unwrap();
        assert_eq!(name.as_str(), "Ada Lovelace");
    }

    #[test]
    fn test_trims_whitespace() {
        let name = DisplayName::new("  Ada  ").unwrap();
        assert_eq!(name.as_str(), "Ada");
    }

    #[test]
    fn test_unicode_name() {
        let name = DisplayName::new("紅茶の人").unwrap();
        assert_eq!(name.as_str(), "紅茶の人");
    }

    #[test]
    fn test_empty_name() {
        assert!(DisplayName::new("").is_err());
        assert!(DisplayName::new("   ").is_err());
    }

    #[test]
    fn test_too_long_name() {
        assert!(DisplayName::new("x".repeat(DISPLAY_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(DisplayName::new("Ada\u{0007}").is_err());
    }
}
