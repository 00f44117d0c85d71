//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, constant-time compare)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//!
//! Domain crates build their token signing and identifier ciphers on top
//! of these primitives; nothing in here knows about accounts or payloads.

pub mod crypto;
pub mod password;
