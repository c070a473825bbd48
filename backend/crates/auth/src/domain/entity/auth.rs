//! Auth Entity
//!
//! Sign-in credentials, kept apart from [`User`](super::user::User) so that
//! profile reads never load them.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{totp_secret::TotpSecret, user_password::UserPassword};

#[derive(Debug, Clone)]
pub struct Auth {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    /// Present once setup started; only trusted when `totp_enabled`
    pub totp_secret: Option<TotpSecret>,
    pub totp_enabled: bool,
    pub login_failed_count: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auth {
    pub const MAX_LOGIN_FAILURES: u16 = 5;
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(user_id: UserId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash,
            totp_secret: None,
            totp_enabled: false,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| Utc::now() < until)
    }

    /// Count a failed attempt; the fifth consecutive one locks the account
    pub fn record_failure(&mut self) {
        let now = Utc::now();
        self.login_failed_count = self.login_failed_count.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        if self.login_failed_count >= Self::MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + Duration::minutes(Self::LOCKOUT_MINUTES));
            self.login_failed_count = 0;
        }
    }

    pub fn reset_failures(&mut self) {
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }

    /// Start (or restart) TOTP enrollment
    pub fn begin_totp_setup(&mut self) -> TotpSecret {
        let secret = TotpSecret::generate();
        self.totp_secret = Some(secret.clone());
        self.totp_enabled = false;
        self.updated_at = Utc::now();
        secret
    }

    pub fn enable_totp(&mut self) {
        if self.totp_secret.is_some() {
            self.totp_enabled = true;
            self.updated_at = Utc::now();
        }
    }

    pub fn disable_totp(&mut self) {
        self.totp_secret = None;
        self.totp_enabled = false;
        self.updated_at = Utc::now();
    }

    pub fn requires_2fa(&self) -> bool {
        self.totp_enabled && self.totp_secret.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;

    fn auth() -> Auth {
        let raw = RawPassword::new("Correct-Horse-7".to_string()).unwrap();
        Auth::new(UserId::new(), UserPassword::from_raw(&raw, None).unwrap())
    }

    #[test]
    fn test_lockout_after_five_failures() {
        let mut auth = auth();
        for _ in 0..4 {
            auth.record_failure();
            assert!(!auth.is_locked());
        }
        auth.record_failure();
        assert!(auth.is_locked());

        auth.reset_failures();
        assert!(!auth.is_locked());
        assert_eq!(auth.login_failed_count, 0);
    }

    #[test]
    fn test_expired_lock_is_not_locked() {
        let mut auth = auth();
        auth.locked_until = Some(Utc::now() - Duration::seconds(1));
        assert!(!auth.is_locked());
    }

    #[test]
    fn test_totp_lifecycle() {
        let mut auth = auth();
        assert!(!auth.requires_2fa());

        auth.begin_totp_setup();
        assert!(!auth.requires_2fa());

        auth.enable_totp();
        assert!(auth.requires_2fa());

        auth.disable_totp();
        assert!(!auth.requires_2fa());
        assert!(auth.totp_secret.is_none());
    }
}
