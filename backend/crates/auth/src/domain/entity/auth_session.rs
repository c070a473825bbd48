//! Auth Session Entity
//!
//! Server-side session referenced by the signed `session_token` cookie.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use platform::client::ClientFingerprint;
use uuid::Uuid;

use crate::domain::value_object::public_id::PublicId;

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub public_id: PublicId,
    /// Unix timestamp in milliseconds
    pub expires_at_ms: i64,
    pub remember_me: bool,
    /// SHA-256 of the User-Agent the session was created with
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(
        user_id: UserId,
        public_id: PublicId,
        remember_me: bool,
        client: &ClientFingerprint,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            public_id,
            expires_at_ms: (now + ttl).timestamp_millis(),
            remember_me,
            client_fingerprint_hash: client.hash_vec(),
            client_ip: client.ip_string(),
            user_agent: client.user_agent.clone(),
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Slide a remember-me session forward once less than half of
    /// `ttl_long` remains. Returns whether the expiry moved.
    pub fn extend_if_needed(&mut self, ttl_long: Duration) -> bool {
        if !self.remember_me {
            return false;
        }

        let now = Utc::now();
        if self.expires_at_ms < (now + ttl_long / 2).timestamp_millis() {
            self.expires_at_ms = (now + ttl_long).timestamp_millis();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClientFingerprint {
        ClientFingerprint::new([7u8; 32], None, Some("test-agent".to_string()))
    }

    #[test]
    fn test_new_session_expiry() {
        let session = AuthSession::new(
            UserId::new(),
            PublicId::new(),
            false,
            &client(),
            Duration::hours(12),
        );
        assert!(!session.is_expired());
        assert_eq!(session.client_fingerprint_hash, vec![7u8; 32]);
        assert_eq!(session.user_agent.as_deref(), Some("test-agent"));
    }

    #[test]
    fn test_extend_only_remember_me_past_half_life() {
        let week = Duration::days(7);

        let mut short = AuthSession::new(UserId::new(), PublicId::new(), false, &client(), Duration::hours(1));
        assert!(!short.extend_if_needed(week));

        let mut fresh = AuthSession::new(UserId::new(), PublicId::new(), true, &client(), week);
        assert!(!fresh.extend_if_needed(week));

        let mut aging = fresh.clone();
        aging.expires_at_ms = (Utc::now() + Duration::days(2)).timestamp_millis();
        assert!(aging.extend_if_needed(week));
        assert!(aging.expires_at_ms > (Utc::now() + Duration::days(6)).timestamp_millis());

        assert!(!fresh.is_expired());
    }
}
