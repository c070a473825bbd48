//! API DTOs (Data Transfer Objects)

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webauthn_rs::prelude::{
    CreationChallengeResponse, PublicKeyCredential, RegisterPublicKeyCredential,
    RequestChallengeResponse,
};

use crate::domain::entity::passkey::PasskeyCredential;

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub public_id: String,
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    /// Required on the second step when 2FA is enabled
    pub totp_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub public_id: String,
    /// No cookie was set; resubmit with `totpCode`
    pub requires_2fa: bool,
    pub expires_at_ms: Option<i64>,
}

// ============================================================================
// Session Status
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub public_id: Option<String>,
    pub email: Option<String>,
    pub expires_at_ms: Option<i64>,
}

impl SessionStatusResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            public_id: None,
            email: None,
            expires_at_ms: None,
        }
    }
}

// ============================================================================
// TOTP
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpSetupResponse {
    /// PNG as base64
    pub qr_code: String,
    /// For manual entry
    pub secret: String,
    pub otpauth_url: String,
}

/// Used by both verify and disable
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpCodeRequest {
    pub code: String,
}

// ============================================================================
// Passkeys
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyResponse {
    /// URL-safe base64, no padding
    pub credential_id: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<&PasskeyCredential> for PasskeyResponse {
    fn from(credential: &PasskeyCredential) -> Self {
        Self {
            credential_id: encode_credential_id(&credential.credential_id),
            label: credential.label.clone(),
            created_at: credential.created_at,
            last_used_at: credential.last_used_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyRegisterBeginResponse {
    pub registration_id: Uuid,
    pub options: CreationChallengeResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyRegisterFinishRequest {
    pub registration_id: Uuid,
    #[serde(default)]
    pub label: String,
    pub credential: RegisterPublicKeyCredential,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyLoginBeginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyLoginBeginResponse {
    pub authentication_id: Uuid,
    pub options: RequestChallengeResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyLoginFinishRequest {
    pub authentication_id: Uuid,
    pub credential: PublicKeyCredential,
}

pub fn encode_credential_id(credential_id: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(credential_id)
}

pub fn decode_credential_id(encoded: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_defaults() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@example.com","password":"pw"}"#).unwrap();
        assert!(!req.remember_me);
        assert!(req.totp_code.is_none());

        let req: LoginRequest = serde_json::from_str(
            r#"{"email":"a@example.com","password":"pw","rememberMe":true,"totpCode":"123456"}"#,
        )
        .unwrap();
        assert!(req.remember_me);
        assert_eq!(req.totp_code.as_deref(), Some("123456"));
    }

    #[test]
    fn test_session_status_serialization() {
        let json = serde_json::to_value(SessionStatusResponse::anonymous()).unwrap();
        assert_eq!(json["authenticated"], false);
        assert!(json["publicId"].is_null());
        assert!(json.get("expiresAtMs").is_some());
    }

    #[test]
    fn test_credential_id_encoding() {
        let encoded = encode_credential_id(&[0xfb, 0xff, 0x01]);
        assert!(!encoded.contains('+') && !encoded.contains('/'));
        assert_eq!(decode_credential_id(&encoded), Some(vec![0xfb, 0xff, 0x01]));
        assert_eq!(decode_credential_id("not base64!"), None);
    }
}
