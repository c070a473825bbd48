//! Authenticated Sealing (AES-256-GCM)
//!
//! A `SealedBox` is `nonce (12 bytes) || ciphertext+tag`. Every call to
//! [`seal`] draws a fresh random nonce, so keys may be reused across boxes.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use hkdf::Hkdf;
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SealError {
    /// Wrong key, wrong associated data or tampered ciphertext
    #[error("Failed to open sealed box")]
    Open,

    #[error("Failed to seal plaintext")]
    Seal,

    #[error("Malformed sealed box")]
    Malformed,

    #[error("Invalid key length: expected {KEY_LEN}, got {0}")]
    InvalidKeyLength(usize),

    #[error("Key derivation failed")]
    KeyDerivation,
}

// ============================================================================
// SealingKey
// ============================================================================

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealingKey([u8; KEY_LEN]);

impl SealingKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SealError> {
        let array: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| SealError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&crypto::random_bytes(KEY_LEN));
        Self(bytes)
    }

    /// HKDF-SHA256 expansion of `ikm` bound to `salt` and `info`
    pub fn derive(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<Self, SealError> {
        let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
        let mut okm = [0u8; KEY_LEN];
        hk.expand(info, &mut okm)
            .map_err(|_| SealError::KeyDerivation)?;
        Ok(Self(okm))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SealingKey([REDACTED])")
    }
}

// ============================================================================
// SealedBox
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBox {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl SealedBox {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SealError> {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(SealError::Malformed);
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let mut nonce_arr = [0u8; NONCE_LEN];
        nonce_arr.copy_from_slice(nonce);
        Ok(Self {
            nonce: nonce_arr,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

pub fn seal(key: &SealingKey, plaintext: &[u8], aad: &[u8]) -> Result<SealedBox, SealError> {
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&crypto::random_bytes(NONCE_LEN));

    let ciphertext = key
        .cipher()
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| SealError::Seal)?;

    Ok(SealedBox { nonce, ciphertext })
}

pub fn open(
    key: &SealingKey,
    sealed: &SealedBox,
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, SealError> {
    key.cipher()
        .decrypt(
            Nonce::from_slice(&sealed.nonce),
            Payload {
                msg: &sealed.ciphertext,
                aad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| SealError::Open)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = SealingKey::generate();
        let sealed = seal(&key, b"launch codes", b"secret-1").unwrap();
        assert_eq!(sealed.ciphertext.len(), b"launch codes".len() + TAG_LEN);

        let opened = open(&key, &sealed, b"secret-1").unwrap();
        assert_eq!(opened.as_slice(), b"launch codes");
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let key = SealingKey::generate();
        let a = seal(&key, b"same", b"").unwrap();
        let b = seal(&key, b"same", b"").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_open_rejects_wrong_key_aad_and_tampering() {
        let key = SealingKey::generate();
        let sealed = seal(&key, b"payload", b"aad").unwrap();

        assert_eq!(
            open(&SealingKey::generate(), &sealed, b"aad").unwrap_err(),
            SealError::Open
        );
        assert_eq!(open(&key, &sealed, b"other").unwrap_err(), SealError::Open);

        let mut tampered = sealed.clone();
        tampered.ciphertext[0] ^= 0x01;
        assert_eq!(open(&key, &tampered, b"aad").unwrap_err(), SealError::Open);
    }

    #[test]
    fn test_bytes_layout() {
        let key = SealingKey::generate();
        let sealed = seal(&key, b"x", b"").unwrap();
        let bytes = sealed.to_bytes();
        assert_eq!(&bytes[..NONCE_LEN], &sealed.nonce);

        let restored = SealedBox::from_bytes(&bytes).unwrap();
        assert_eq!(open(&key, &restored, b"").unwrap().as_slice(), b"x");

        assert_eq!(
            SealedBox::from_bytes(&[0u8; NONCE_LEN + TAG_LEN - 1]).unwrap_err(),
            SealError::Malformed
        );
    }

    #[test]
    fn test_derive_is_deterministic_and_separated() {
        let a = SealingKey::derive(b"answer", b"salt", b"answer:1").unwrap();
        let b = SealingKey::derive(b"answer", b"salt", b"answer:1").unwrap();
        let c = SealingKey::derive(b"answer", b"salt", b"answer:2").unwrap();
        let d = SealingKey::derive(b"answer", b"pepper", b"answer:1").unwrap();

        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
        assert_ne!(a.as_bytes(), d.as_bytes());
    }

    #[test]
    fn test_key_from_slice_length() {
        assert_eq!(
            SealingKey::from_slice(&[1u8; 16]).unwrap_err(),
            SealError::InvalidKeyLength(16)
        );
        assert!(SealingKey::from_slice(&[1u8; 32]).is_ok());
        assert_eq!(
            format!("{:?}", SealingKey::generate()),
            "SealingKey([REDACTED])"
        );
    }
}
