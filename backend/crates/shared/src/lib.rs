//! Shared Kernel
//!
//! Vocabulary every Deadswitch crate agrees on:
//! - The unified error type and its HTTP mapping
//! - Typed identifiers for users and vault entities
//!
//! Anything that only one bounded context needs lives in that context's crate.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
