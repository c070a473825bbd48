//! Secret Assignment Entity
//!
//! Links a secret to a recipient. The recipient reaches it through an access
//! token that is shown once; only its SHA-256 is stored.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{AssignmentId, RecipientId, SecretId, UserId};
use platform::crypto::{random_token, sha256};

const ACCESS_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct SecretAssignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub secret_id: SecretId,
    pub recipient_id: RecipientId,
    pub access_token_hash: Vec<u8>,
    pub released_at: Option<DateTime<Utc>>,
    /// Consecutive wrong-answer unlocks since the last lockout or success
    pub failed_unlock_count: i16,
    pub unlock_locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SecretAssignment {
    pub const MAX_UNLOCK_FAILURES: i16 = 5;
    pub const UNLOCK_LOCKOUT_MINUTES: i64 = 15;

    /// Returns the assignment and its clear access token
    pub fn new(user_id: UserId, secret_id: SecretId, recipient_id: RecipientId) -> (Self, String) {
        let token = random_token(ACCESS_TOKEN_BYTES);
        let assignment = Self {
            id: AssignmentId::new(),
            user_id,
            secret_id,
            recipient_id,
            access_token_hash: hash_access_token(&token),
            released_at: None,
            failed_unlock_count: 0,
            unlock_locked_until: None,
            created_at: Utc::now(),
        };
        (assignment, token)
    }

    pub fn is_released(&self) -> bool {
        self.released_at.is_some()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn is_unlock_locked(&self, now: DateTime<Utc>) -> bool {
        self.unlock_locked_until.is_some_and(|until| now < until)
    }

    /// Count a wrong-answer unlock; the fifth in a row locks unlocking
    pub fn record_unlock_failure(&mut self, now: DateTime<Utc>) {
        self.failed_unlock_count = self.failed_unlock_count.saturating_add(1);
        if self.failed_unlock_count >= Self::MAX_UNLOCK_FAILURES {
            self.unlock_locked_until = Some(now + Duration::minutes(Self::UNLOCK_LOCKOUT_MINUTES));
            self.failed_unlock_count = 0;
        }
    }

    /// Returns whether anything changed
    pub fn reset_unlock_failures(&mut self) -> bool {
        let dirty = self.failed_unlock_count != 0 || self.unlock_locked_until.is_some();
        self.failed_unlock_count = 0;
        self.unlock_locked_until = None;
        dirty
    }
}

pub fn hash_access_token(token: &str) -> Vec<u8> {
    sha256(token.as_bytes()).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assignment_hashes_token() {
        let (assignment, token) =
            SecretAssignment::new(UserId::new(), SecretId::new(), RecipientId::new());
        assert_eq!(assignment.access_token_hash, hash_access_token(&token));
        assert_ne!(assignment.access_token_hash, token.as_bytes());
        assert!(!assignment.is_released());
        assert!(token.len() >= 43);
    }

    #[test]
    fn test_unlock_lockout_after_repeated_failures() {
        let (mut assignment, _) =
            SecretAssignment::new(UserId::new(), SecretId::new(), RecipientId::new());
        let now = Utc::now();

        for _ in 0..SecretAssignment::MAX_UNLOCK_FAILURES - 1 {
            assignment.record_unlock_failure(now);
            assert!(!assignment.is_unlock_locked(now));
        }
        assignment.record_unlock_failure(now);
        assert!(assignment.is_unlock_locked(now));
        assert_eq!(assignment.failed_unlock_count, 0);

        let later = now + Duration::minutes(SecretAssignment::UNLOCK_LOCKOUT_MINUTES);
        assert!(!assignment.is_unlock_locked(later));

        assert!(assignment.reset_unlock_failures());
        assert!(!assignment.reset_unlock_failures());
    }
}
