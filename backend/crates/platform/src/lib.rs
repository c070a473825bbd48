//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business meaning:
//! - Cryptographic utilities (SHA-256, HMAC, Base64, random tokens)
//! - Password hashing (Argon2id)
//! - Cookie and client fingerprint helpers
//! - Shamir secret sharing over GF(256)
//! - AES-256-GCM sealing with HKDF key derivation
//! - Round-based timelock encryption

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod seal;
pub mod sharing;
pub mod timelock;
