//! User Password Value Objects
//!
//! Domain wrappers over `platform::password` that translate policy and
//! hashing failures into user-facing `AppError`s.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

// ============================================================================
// RawPassword
// ============================================================================

/// Password as typed by the user, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// A newly chosen password; the policy applies
    pub fn new(raw: String) -> AppResult<Self> {
        ClearTextPassword::new(raw).map(Self).map_err(policy_error)
    }

    /// A login attempt; compared as-is
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }
}

fn policy_error(err: PasswordPolicyError) -> AppError {
    let action = match &err {
        PasswordPolicyError::TooShort { .. } => "Choose a longer password",
        PasswordPolicyError::TooLong { .. } => "Choose a shorter password",
        PasswordPolicyError::EmptyOrWhitespace => "Enter a password",
        PasswordPolicyError::InvalidCharacter => "Remove control characters from the password",
        PasswordPolicyError::CommonPattern => "Avoid repeated, sequential or keyboard patterns",
    };
    AppError::bad_request(err.to_string()).with_action(action)
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword([REDACTED])")
    }
}

// ============================================================================
// UserPassword
// ============================================================================

/// Argon2id PHC string as stored in `auth_credentials.password_hash`
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        raw.0
            .hash(pepper)
            .map(Self)
            .map_err(|e| AppError::internal(e.to_string()))
    }

    pub fn from_phc_string(phc: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc)
            .map(Self)
            .map_err(|_| AppError::internal("Invalid password hash in database"))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword([HASH])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_errors_are_bad_requests() {
        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.action().is_some());

        assert!(RawPassword::new("12345678".to_string()).is_err());
        assert!(RawPassword::new("Correct-Horse-7".to_string()).is_ok());
    }

    #[test]
    fn test_hash_and_verify_with_pepper() {
        let raw = RawPassword::new("Correct-Horse-7".to_string()).unwrap();
        let pepper: &[u8] = b"pepper";
        let hashed = UserPassword::from_raw(&raw, Some(pepper)).unwrap();

        assert!(hashed.verify(&RawPassword::for_login("Correct-Horse-7".to_string()), Some(pepper)));
        assert!(!hashed.verify(&RawPassword::for_login("Correct-Horse-7".to_string()), None));
        assert!(!hashed.verify(&RawPassword::for_login("wrong".to_string()), Some(pepper)));

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert_eq!(restored, hashed);
        assert!(UserPassword::from_phc_string("plain").is_err());
    }

    #[test]
    fn test_debug_redacted() {
        let raw = RawPassword::new("Correct-Horse-7".to_string()).unwrap();
        assert!(!format!("{raw:?}").contains("Horse"));
        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert_eq!(format!("{hashed:?}"), "UserPassword([HASH])");
    }
}
