//! Passkey Credential Entity

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use webauthn_rs::prelude::{AuthenticationResult, Passkey};

/// A WebAuthn credential registered to a user
#[derive(Debug, Clone)]
pub struct PasskeyCredential {
    /// Raw credential id as issued by the authenticator
    pub credential_id: Vec<u8>,
    pub user_id: UserId,
    pub label: String,
    pub passkey: Passkey,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl PasskeyCredential {
    pub const MAX_LABEL_LENGTH: usize = 64;

    pub fn new(user_id: UserId, label: &str, passkey: Passkey) -> Self {
        let label = label.trim();
        let label = if label.is_empty() {
            "Passkey".to_string()
        } else {
            label.chars().take(Self::MAX_LABEL_LENGTH).collect()
        };

        Self {
            credential_id: passkey.cred_id().as_slice().to_vec(),
            user_id,
            label,
            passkey,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    /// Apply the counter and backup state from a successful assertion
    pub fn record_use(&mut self, result: &AuthenticationResult) {
        self.passkey.update_credential(result);
        self.last_used_at = Some(Utc::now());
    }
}
