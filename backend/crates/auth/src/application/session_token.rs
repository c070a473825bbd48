//! Session Tokens
//!
//! Cookie value format: `<session uuid>.<base64url(HMAC-SHA256(secret, uuid))>`.
//! The signature lets forged cookies be rejected before touching the
//! database.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &[u8]) -> AuthResult<HmacSha256> {
    HmacSha256::new_from_slice(secret).map_err(|e| AuthError::Internal(e.to_string()))
}

pub fn issue(secret: &[u8], session_id: Uuid) -> AuthResult<String> {
    let id = session_id.to_string();
    let mut mac = mac(secret)?;
    mac.update(id.as_bytes());
    let signature = mac.finalize().into_bytes();
    Ok(format!("{id}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

pub fn parse(secret: &[u8], token: &str) -> AuthResult<Uuid> {
    let (id, signature_b64) = token.split_once('.').ok_or(AuthError::SessionInvalid)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::SessionInvalid)?;

    let mut mac = mac(secret)?;
    mac.update(id.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::SessionInvalid)?;

    id.parse().map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = &[42u8; 32];

    #[test]
    fn test_issue_then_parse() {
        let id = Uuid::new_v4();
        let token = issue(SECRET, id).unwrap();
        assert!(token.starts_with(&id.to_string()));
        assert_eq!(parse(SECRET, &token).unwrap(), id);
    }

    #[test]
    fn test_rejects_forgery() {
        let id = Uuid::new_v4();
        let token = issue(SECRET, id).unwrap();

        assert!(parse(&[1u8; 32], &token).is_err());

        let other = Uuid::new_v4();
        let (_, sig) = token.split_once('.').unwrap();
        assert!(parse(SECRET, &format!("{other}.{sig}")).is_err());

        assert!(parse(SECRET, "no-dot").is_err());
        assert!(parse(SECRET, &format!("{id}.***")).is_err());
    }
}
