//! Shamir Secret Sharing
//!
//! Splits a key into `n` shares over GF(256) so that any `threshold` of
//! them reconstruct it and fewer reveal nothing. Each share is serialized
//! as `x || y_1..y_len` (one byte of x coordinate, then one byte per secret
//! byte).

use std::fmt;

use sharks::{Share, Sharks};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SharingError {
    #[error("Threshold must be between 1 and {share_count} (got {threshold})")]
    InvalidThreshold { threshold: u8, share_count: u8 },

    #[error("Cannot split an empty secret")]
    EmptySecret,

    #[error("Not enough shares: need {needed}, got {provided}")]
    NotEnoughShares { needed: u8, provided: usize },

    #[error("Malformed share")]
    MalformedShare,
}

/// One serialized share of a split secret
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyShare(Vec<u8>);

impl KeyShare {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SharingError> {
        // x coordinate plus at least one y byte; x = 0 would be the secret itself
        if bytes.len() < 2 || bytes[0] == 0 {
            return Err(SharingError::MalformedShare);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// x coordinate of the share
    pub fn index(&self) -> u8 {
        self.0[0]
    }
}

impl fmt::Debug for KeyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyShare")
            .field("index", &self.index())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Split `secret` into `share_count` shares, any `threshold` of which recover it
pub fn split_secret(
    secret: &[u8],
    threshold: u8,
    share_count: u8,
) -> Result<Vec<KeyShare>, SharingError> {
    if secret.is_empty() {
        return Err(SharingError::EmptySecret);
    }
    if threshold == 0 || threshold > share_count {
        return Err(SharingError::InvalidThreshold {
            threshold,
            share_count,
        });
    }

    let sharks = Sharks(threshold);
    Ok(sharks
        .dealer(secret)
        .take(share_count as usize)
        .map(|share| KeyShare(Vec::from(&share)))
        .collect())
}

/// Recover the secret from at least `threshold` distinct shares
///
/// Shares repeated with the same x coordinate count once.
pub fn combine_shares(
    threshold: u8,
    shares: &[KeyShare],
) -> Result<Zeroizing<Vec<u8>>, SharingError> {
    if threshold == 0 {
        return Err(SharingError::InvalidThreshold {
            threshold,
            share_count: shares.len().min(u8::MAX as usize) as u8,
        });
    }

    let mut seen = [false; 256];
    let mut parts = Vec::with_capacity(shares.len());
    for share in shares {
        if seen[share.index() as usize] {
            continue;
        }
        seen[share.index() as usize] = true;
        let part =
            Share::try_from(share.as_bytes()).map_err(|_| SharingError::MalformedShare)?;
        parts.push(part);
    }

    if parts.len() < threshold as usize {
        return Err(SharingError::NotEnoughShares {
            needed: threshold,
            provided: parts.len(),
        });
    }

    Sharks(threshold)
        .recover(parts.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| SharingError::MalformedShare)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_threshold_subset_recovers() {
        let secret = [7u8; 32];
        let shares = split_secret(&secret, 3, 5).unwrap();
        assert_eq!(shares.len(), 5);

        for subset in [[0, 1, 2], [1, 3, 4], [0, 2, 4], [4, 3, 0]] {
            let picked: Vec<KeyShare> = subset.iter().map(|&i| shares[i].clone()).collect();
            let recovered = combine_shares(3, &picked).unwrap();
            assert_eq!(recovered.as_slice(), &secret);
        }

        let all = combine_shares(3, &shares).unwrap();
        assert_eq!(all.as_slice(), &secret);
    }

    #[test]
    fn test_below_threshold_fails() {
        let shares = split_secret(b"top secret key", 3, 5).unwrap();
        let result = combine_shares(3, &shares[..2]);
        assert_eq!(
            result.unwrap_err(),
            SharingError::NotEnoughShares {
                needed: 3,
                provided: 2
            }
        );
    }

    #[test]
    fn test_duplicate_shares_count_once() {
        let shares = split_secret(b"top secret key", 2, 3).unwrap();
        let duplicated = vec![shares[0].clone(), shares[0].clone()];
        assert!(matches!(
            combine_shares(2, &duplicated),
            Err(SharingError::NotEnoughShares { provided: 1, .. })
        ));
    }

    #[test]
    fn test_threshold_of_one() {
        let shares = split_secret(b"k", 1, 3).unwrap();
        for share in &shares {
            let recovered = combine_shares(1, std::slice::from_ref(share)).unwrap();
            assert_eq!(recovered.as_slice(), b"k");
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            split_secret(b"k", 0, 3).unwrap_err(),
            SharingError::InvalidThreshold {
                threshold: 0,
                share_count: 3
            }
        );
        assert!(split_secret(b"k", 4, 3).is_err());
        assert_eq!(split_secret(b"", 1, 1).unwrap_err(), SharingError::EmptySecret);
        assert_eq!(
            KeyShare::from_bytes(vec![0, 1, 2]).unwrap_err(),
            SharingError::MalformedShare
        );
        assert!(KeyShare::from_bytes(vec![3]).is_err());
    }

    #[test]
    fn test_share_bytes_restore() {
        let shares = split_secret(&[9u8; 16], 2, 2).unwrap();
        let restored: Vec<KeyShare> = shares
            .iter()
            .map(|s| KeyShare::from_bytes(s.as_bytes().to_vec()).unwrap())
            .collect();
        assert_eq!(combine_shares(2, &restored).unwrap().as_slice(), &[9u8; 16]);
    }
}
