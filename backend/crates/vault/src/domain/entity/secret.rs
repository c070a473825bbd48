//! Secret Entity
//!
//! The content is never held in clear on the entity; `sealed_content` is an
//! AES-GCM box under the master key with the secret id as associated data.

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use kernel::id::{SecretId, UserId};

use crate::error::VaultResult;

pub const MAX_NAME_CHARS: usize = 200;
pub const MAX_CONTENT_BYTES: usize = 65_536;

#[derive(Debug, Clone)]
pub struct Secret {
    pub id: SecretId,
    pub user_id: UserId,
    pub name: String,
    pub sealed_content: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Secret {
    /// The caller seals the content under `id` before persisting
    pub fn new(user_id: UserId, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: SecretId::new(),
            user_id,
            name,
            sealed_content: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// Trimmed name, 1..=200 characters
pub fn validate_name(name: &str) -> VaultResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Secret name is required").into());
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::bad_request("Secret name is too long")
            .with_action("Use at most 200 characters")
            .into());
    }
    Ok(name.to_string())
}

/// Content is stored as given, 1..=65536 bytes
pub fn validate_content(content: &str) -> VaultResult<()> {
    if content.is_empty() {
        return Err(AppError::bad_request("Secret content is required").into());
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(AppError::bad_request("Secret content is too large")
            .with_action("Keep the content under 64 KiB")
            .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Bank PIN ").unwrap(), "Bank PIN");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_CHARS)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_content() {
        assert!(validate_content("").is_err());
        assert!(validate_content("hunter2").is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_BYTES)).is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_BYTES + 1)).is_err());
    }
}
