//! Common ID Types
//!
//! Type-safe wrappers around the internal `BIGSERIAL` keys of catalog
//! entities.
//!
//! Internal identifiers are sequential and must never be serialized in
//! clear form: `Id<T>` deliberately implements neither `Serialize` nor
//! `Deserialize`. The boundary layer's opaque codec is the only place an
//! identifier crosses into or out of a payload.
//!
//! Usage:
//! ```
//! use kernel::id::{Id, markers};
//! type AccountId = Id<markers::Account>;
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Generic typed ID wrapper over an internal database key
pub struct Id<T> {
    value: i64,
    _marker: PhantomData<T>,
}

// Manual impls: derives would demand the marker type itself implement
// these traits, which markers never do.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Id<T> {
    /// Create from a raw database key
    pub fn from_raw(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Get the underlying key
    pub fn as_i64(&self) -> i64 {
        self.value
    }

    /// Convert to the raw key
    pub fn into_inner(self) -> i64 {
        self.value
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::from_raw(value)
    }
}

impl<T> From<Id<T>> for i64 {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for Account IDs
    pub struct Account;

    /// Marker for catalog Item IDs
    pub struct Item;

    /// Marker for Review IDs
    pub struct Review;

    /// Marker for Tag IDs
    pub struct Tag;
}

/// Type aliases for common IDs
pub type AccountId = Id<markers::Account>;
pub type ItemId = Id<markers::Item>;
pub type ReviewId = Id<markers::Review>;
pub type TagId = Id<markers::Tag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_type_safety() {
        let account_id: AccountId = Id::from_raw(7);
        let item_id: ItemId = Id::from_raw(7);

        // These are different types, cannot be mixed
        let _a: i64 = account_id.into_inner();
        let _i: i64 = item_id.into_inner();
    }

    #[test]
    fn test_id_roundtrip() {
        let id: AccountId = Id::from_raw(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(AccountId::from(42), id);
    }

    #[test]
    fn test_id_display() {
        let id: ReviewId = Id::from_raw(9000);
        assert_eq!(id.to_string(), "9000");
        assert_eq!(format!("{:?}", id), "Id(9000)");
    }
}
