//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Typed internal identifiers for catalog entities
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains. Internal identifiers
//! in particular are kernel vocabulary because every layer handles them,
//! while none may serialize them in clear form.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
