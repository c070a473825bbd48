//! Round-based Timelock Encryption
//!
//! A beacon publishes one round every `period` seconds starting at
//! `genesis`. Data encrypted to round `r` can only be decrypted once the
//! beacon releases the key of round `r`, which it refuses to do before
//! `round_time(r)`.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto;
use crate::seal::{self, SealError, SealedBox, SealingKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelockError {
    #[error("Round {round} is not available until {available_at}")]
    TooEarly {
        round: u64,
        available_at: DateTime<Utc>,
    },

    #[error("Invalid round: {0}")]
    InvalidRound(u64),

    #[error("Malformed timelock envelope")]
    Malformed,

    #[error(transparent)]
    Seal(#[from] SealError),
}

// ============================================================================
// RoundSchedule
// ============================================================================

/// Round numbering of a beacon; round 1 starts at `genesis`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSchedule {
    /// Unix seconds
    pub genesis: i64,
    /// Seconds between rounds, at least 1
    pub period: u64,
}

impl RoundSchedule {
    pub fn new(genesis: i64, period: u64) -> Self {
        Self {
            genesis,
            period: period.max(1),
        }
    }

    /// Latest round published at unix time `t`
    pub fn round_at(&self, t: i64) -> u64 {
        if t < self.genesis {
            return 1;
        }
        ((t - self.genesis) as u64) / self.period + 1
    }

    /// Unix time at which `round` is published
    pub fn round_time(&self, round: u64) -> i64 {
        let elapsed = round.saturating_sub(1).saturating_mul(self.period);
        self.genesis
            .saturating_add(i64::try_from(elapsed).unwrap_or(i64::MAX))
    }

    /// First round published at or after `deadline`
    pub fn round_for_deadline(&self, deadline: i64) -> u64 {
        if deadline <= self.genesis {
            return 1;
        }
        let elapsed = (deadline - self.genesis) as u64;
        elapsed.div_ceil(self.period) + 1
    }

    pub fn round_datetime(&self, round: u64) -> DateTime<Utc> {
        Utc.timestamp_opt(self.round_time(round), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

// ============================================================================
// Beacon
// ============================================================================

pub trait Beacon: Send + Sync {
    fn schedule(&self) -> RoundSchedule;

    fn current_round(&self, now: DateTime<Utc>) -> u64 {
        self.schedule().round_at(now.timestamp())
    }

    /// Key used to encrypt towards `round`; available at any time
    fn sealing_key(&self, round: u64) -> Result<SealingKey, TimelockError>;

    /// Key of `round`, released only once the round has been published
    fn round_key(&self, round: u64, now: DateTime<Utc>) -> Result<SealingKey, TimelockError>;
}

/// In-process beacon deriving round keys from a server secret
pub struct LocalBeacon {
    schedule: RoundSchedule,
    secret: Zeroizing<Vec<u8>>,
}

impl LocalBeacon {
    pub fn new(schedule: RoundSchedule, secret: &[u8]) -> Self {
        Self {
            schedule,
            secret: Zeroizing::new(secret.to_vec()),
        }
    }

    fn derive(&self, round: u64) -> Result<SealingKey, TimelockError> {
        if round == 0 {
            return Err(TimelockError::InvalidRound(round));
        }
        let label = format!("round:{round}");
        Ok(SealingKey::from_bytes(crypto::hmac_sha256(
            &self.secret,
            label.as_bytes(),
        )))
    }
}

impl std::fmt::Debug for LocalBeacon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBeacon")
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

impl Beacon for LocalBeacon {
    fn schedule(&self) -> RoundSchedule {
        self.schedule
    }

    fn sealing_key(&self, round: u64) -> Result<SealingKey, TimelockError> {
        self.derive(round)
    }

    fn round_key(&self, round: u64, now: DateTime<Utc>) -> Result<SealingKey, TimelockError> {
        if round == 0 {
            return Err(TimelockError::InvalidRound(round));
        }
        if now.timestamp() < self.schedule.round_time(round) {
            return Err(TimelockError::TooEarly {
                round,
                available_at: self.schedule.round_datetime(round),
            });
        }
        self.derive(round)
    }
}

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelockEnvelope {
    pub round: u64,
    pub sealed: SealedBox,
}

impl TimelockEnvelope {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.round.to_be_bytes().to_vec();
        out.extend_from_slice(&self.sealed.to_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TimelockError> {
        if bytes.len() < 8 {
            return Err(TimelockError::Malformed);
        }
        let (round, rest) = bytes.split_at(8);
        let mut round_bytes = [0u8; 8];
        round_bytes.copy_from_slice(round);
        let round = u64::from_be_bytes(round_bytes);
        if round == 0 {
            return Err(TimelockError::Malformed);
        }
        let sealed = SealedBox::from_bytes(rest).map_err(|_| TimelockError::Malformed)?;
        Ok(Self { round, sealed })
    }
}

pub fn timelock_encrypt<B: Beacon + ?Sized>(
    beacon: &B,
    round: u64,
    plaintext: &[u8],
) -> Result<TimelockEnvelope, TimelockError> {
    let key = beacon.sealing_key(round)?;
    let sealed = seal::seal(&key, plaintext, &round.to_be_bytes())?;
    Ok(TimelockEnvelope { round, sealed })
}

pub fn timelock_decrypt<B: Beacon + ?Sized>(
    beacon: &B,
    envelope: &TimelockEnvelope,
    now: DateTime<Utc>,
) -> Result<Zeroizing<Vec<u8>>, TimelockError> {
    let key = beacon.round_key(envelope.round, now)?;
    Ok(seal::open(
        &key,
        &envelope.sealed,
        &envelope.round.to_be_bytes(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn beacon() -> LocalBeacon {
        LocalBeacon::new(RoundSchedule::new(1_000, 30), b"beacon-secret")
    }

    #[test]
    fn test_round_arithmetic() {
        let s = RoundSchedule::new(1_000, 30);
        assert_eq!(s.round_at(0), 1);
        assert_eq!(s.round_at(1_000), 1);
        assert_eq!(s.round_at(1_029), 1);
        assert_eq!(s.round_at(1_030), 2);
        assert_eq!(s.round_time(1), 1_000);
        assert_eq!(s.round_time(3), 1_060);

        assert_eq!(s.round_for_deadline(500), 1);
        assert_eq!(s.round_for_deadline(1_000), 1);
        assert_eq!(s.round_for_deadline(1_001), 2);
        assert_eq!(s.round_for_deadline(1_030), 2);
        assert_eq!(s.round_for_deadline(1_031), 3);

        let round = s.round_for_deadline(5_555);
        assert!(s.round_time(round) >= 5_555);
        assert!(s.round_time(round - 1) < 5_555);
    }

    #[test]
    fn test_decrypt_before_round_is_refused() {
        let b = beacon();
        let envelope = timelock_encrypt(&b, 5, b"shares").unwrap();

        match timelock_decrypt(&b, &envelope, at(1_119)) {
            Err(TimelockError::TooEarly {
                round,
                available_at,
            }) => {
                assert_eq!(round, 5);
                assert_eq!(available_at, at(1_120));
            }
            other => panic!("expected TooEarly, got {other:?}"),
        }

        let opened = timelock_decrypt(&b, &envelope, at(1_120)).unwrap();
        assert_eq!(opened.as_slice(), b"shares");
    }

    #[test]
    fn test_round_keys_differ_per_round_and_secret() {
        let b = beacon();
        let other = LocalBeacon::new(RoundSchedule::new(1_000, 30), b"another-secret");
        let now = at(10_000);

        let k1 = b.round_key(1, now).unwrap();
        let k2 = b.round_key(2, now).unwrap();
        let k1_other = other.round_key(1, now).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
        assert_ne!(k1.as_bytes(), k1_other.as_bytes());

        assert_eq!(
            b.round_key(0, now).unwrap_err(),
            TimelockError::InvalidRound(0)
        );
    }

    #[test]
    fn test_envelope_bytes() {
        let b = beacon();
        let envelope = timelock_encrypt(&b, 7, b"payload").unwrap();
        let bytes = envelope.to_bytes();
        assert_eq!(&bytes[..8], &7u64.to_be_bytes());

        let restored = TimelockEnvelope::from_bytes(&bytes).unwrap();
        assert_eq!(restored, envelope);

        // round number is authenticated
        let mut moved = restored.clone();
        moved.round = 1;
        assert!(matches!(
            timelock_decrypt(&b, &moved, at(10_000)),
            Err(TimelockError::Seal(SealError::Open))
        ));

        assert_eq!(
            TimelockEnvelope::from_bytes(&bytes[..10]).unwrap_err(),
            TimelockError::Malformed
        );
    }

    #[test]
    fn test_current_round() {
        let b = beacon();
        assert_eq!(b.current_round(at(1_065)), 3);
    }
}
