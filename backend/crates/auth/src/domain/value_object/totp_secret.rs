//! TOTP Secret
//!
//! RFC 6238 codes compatible with common authenticator apps: SHA-1,
//! 6 digits, 30 second step, one step of clock skew tolerated.

use kernel::error::app_error::{AppError, AppResult};
use totp_rs::{Algorithm, Secret, TOTP};

const TOTP_DIGITS: usize = 6;
const TOTP_SKEW: u8 = 1;
const TOTP_STEP: u64 = 30;
const TOTP_ISSUER: &str = "Deadswitch";

#[derive(Clone)]
pub struct TotpSecret {
    base32: String,
}

impl TotpSecret {
    pub fn generate() -> Self {
        Self {
            base32: Secret::generate_secret().to_encoded().to_string(),
        }
    }

    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let base32 = secret.into();
        Secret::Encoded(base32.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {e}")))?;
        Ok(Self { base32 })
    }

    pub fn as_base32(&self) -> &str {
        &self.base32
    }

    fn totp(&self, account_name: &str) -> AppResult<TOTP> {
        let bytes = Secret::Encoded(self.base32.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {e}")))?;

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            bytes,
            Some(TOTP_ISSUER.to_string()),
            account_name.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to build TOTP: {e}")))
    }

    pub fn verify(&self, code: &str, account_name: &str) -> AppResult<bool> {
        let code = code.trim();
        if code.len() != TOTP_DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
            return Ok(false);
        }
        let totp = self.totp(account_name)?;
        Ok(totp.check_current(code).unwrap_or(false))
    }

    /// Code for the current step
    pub fn current_code(&self, account_name: &str) -> AppResult<String> {
        self.totp(account_name)?
            .generate_current()
            .map_err(|e| AppError::internal(format!("Failed to generate TOTP: {e}")))
    }

    /// PNG QR code, base64 encoded
    pub fn qr_code(&self, account_name: &str) -> AppResult<String> {
        self.totp(account_name)?
            .get_qr_base64()
            .map_err(|e| AppError::internal(format!("Failed to render QR code: {e}")))
    }

    pub fn otpauth_url(&self, account_name: &str) -> AppResult<String> {
        Ok(self.totp(account_name)?.get_url())
    }
}

impl std::fmt::Debug for TotpSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TotpSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "alice@example.com";

    #[test]
    fn test_current_code_verifies() {
        let secret = TotpSecret::generate();
        let code = secret.current_code(ACCOUNT).unwrap();
        assert!(secret.verify(&code, ACCOUNT).unwrap());
        assert!(secret.verify(&format!(" {code} "), ACCOUNT).unwrap());
    }

    #[test]
    fn test_malformed_codes_rejected() {
        let secret = TotpSecret::generate();
        assert!(!secret.verify("12345", ACCOUNT).unwrap());
        assert!(!secret.verify("abcdef", ACCOUNT).unwrap());
        assert!(!secret.verify("", ACCOUNT).unwrap());
    }

    #[test]
    fn test_base32_restore() {
        let secret = TotpSecret::generate();
        let restored = TotpSecret::from_base32(secret.as_base32()).unwrap();
        assert_eq!(
            secret.current_code(ACCOUNT).unwrap(),
            restored.current_code(ACCOUNT).unwrap()
        );
        assert!(TotpSecret::from_base32("not base32 !!").is_err());
    }

    #[test]
    fn test_otpauth_url() {
        let secret = TotpSecret::generate();
        let url = secret.otpauth_url(ACCOUNT).unwrap();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains("Deadswitch"));
        assert!(!secret.qr_code(ACCOUNT).unwrap().is_empty());
        assert_eq!(format!("{secret:?}"), "TotpSecret([REDACTED])");
    }
}
