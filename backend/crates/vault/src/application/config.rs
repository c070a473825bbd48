//! Vault Configuration

use std::time::Duration;

use platform::crypto;
use platform::seal::SealingKey;
use platform::timelock::{LocalBeacon, RoundSchedule};

#[derive(Clone)]
pub struct VaultConfig {
    /// Seals secret content and re-armable share bundles
    pub master_key: SealingKey,
    /// Root of the local beacon's round keys
    pub beacon_secret: [u8; 32],
    /// Unix seconds of beacon round 1
    pub beacon_genesis: i64,
    pub beacon_period_secs: u64,
    pub release_scan_interval: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            master_key: SealingKey::from_bytes([0u8; 32]),
            beacon_secret: [0u8; 32],
            beacon_genesis: 1_700_000_000,
            beacon_period_secs: 30,
            release_scan_interval: Duration::from_secs(300),
        }
    }
}

impl VaultConfig {
    pub fn with_random_secret() -> Self {
        let mut beacon_secret = [0u8; 32];
        beacon_secret.copy_from_slice(&crypto::random_bytes(32));
        Self {
            master_key: SealingKey::generate(),
            beacon_secret,
            ..Default::default()
        }
    }

    /// Random keys, one minute release scan
    pub fn development() -> Self {
        Self {
            release_scan_interval: Duration::from_secs(60),
            ..Self::with_random_secret()
        }
    }

    pub fn schedule(&self) -> RoundSchedule {
        RoundSchedule::new(self.beacon_genesis, self.beacon_period_secs)
    }

    pub fn beacon(&self) -> LocalBeacon {
        LocalBeacon::new(self.schedule(), &self.beacon_secret)
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("master_key", &"[REDACTED]")
            .field("beacon_secret", &"[REDACTED]")
            .field("beacon_genesis", &self.beacon_genesis)
            .field("beacon_period_secs", &self.beacon_period_secs)
            .field("release_scan_interval", &self.release_scan_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::timelock::Beacon;

    #[test]
    fn test_random_keys_and_redacted_debug() {
        let a = VaultConfig::with_random_secret();
        let b = VaultConfig::with_random_secret();
        assert_ne!(a.master_key.as_bytes(), b.master_key.as_bytes());
        assert_ne!(a.beacon_secret, [0u8; 32]);

        let debug = format!("{a:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&format!("{:?}", a.beacon_secret)));
    }

    #[test]
    fn test_beacon_uses_schedule() {
        let config = VaultConfig::development();
        assert_eq!(config.release_scan_interval, Duration::from_secs(60));
        assert_eq!(config.beacon().schedule(), RoundSchedule::new(1_700_000_000, 30));
    }
}
