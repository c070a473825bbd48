//! Activity Recorder
//!
//! Writes audit and ping rows on behalf of other contexts. A failed write is
//! logged and dropped; callers never see it.

use std::sync::Arc;

use kernel::id::UserId;
use platform::client::ClientFingerprint;

use crate::domain::entity::{AuditLog, PingHistory, PingMethod};
use crate::domain::repository::{AuditLogRepository, PingHistoryRepository};

pub struct ActivityRecorder<R> {
    repo: Arc<R>,
}

impl<R> Clone for ActivityRecorder<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R> ActivityRecorder<R>
where
    R: AuditLogRepository + PingHistoryRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn audit(
        &self,
        user_id: &UserId,
        action: &str,
        details: Option<String>,
        client: Option<&ClientFingerprint>,
    ) {
        let entry = AuditLog::new(*user_id, action, details, client);
        if let Err(e) = AuditLogRepository::record(self.repo.as_ref(), &entry).await {
            tracing::warn!(
                user_id = %user_id,
                action = %action,
                error = %e,
                "Failed to write audit log"
            );
        }
    }

    pub async fn ping(
        &self,
        user_id: &UserId,
        method: PingMethod,
        client: Option<&ClientFingerprint>,
    ) {
        let ping = PingHistory::new(*user_id, method, client);
        if let Err(e) = PingHistoryRepository::record(self.repo.as_ref(), &ping).await {
            tracing::warn!(
                user_id = %user_id,
                method = %method,
                error = %e,
                "Failed to write ping history"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ActivityError, ActivityResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryRepo {
        fail: bool,
        audits: Mutex<Vec<AuditLog>>,
        pings: Mutex<Vec<PingHistory>>,
    }

    impl AuditLogRepository for MemoryRepo {
        async fn record(&self, entry: &AuditLog) -> ActivityResult<()> {
            if self.fail {
                return Err(ActivityError::Internal("disk full".into()));
            }
            self.audits.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn list_for_user(&self, user_id: &UserId, limit: i64) -> ActivityResult<Vec<AuditLog>> {
            let rows = self.audits.lock().unwrap();
            Ok(rows
                .iter()
                .rev()
                .filter(|r| &r.user_id == user_id)
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    impl PingHistoryRepository for MemoryRepo {
        async fn record(&self, ping: &PingHistory) -> ActivityResult<()> {
            if self.fail {
                return Err(ActivityError::Internal("disk full".into()));
            }
            self.pings.lock().unwrap().push(ping.clone());
            Ok(())
        }

        async fn list_for_user(
            &self,
            user_id: &UserId,
            limit: i64,
        ) -> ActivityResult<Vec<PingHistory>> {
            let rows = self.pings.lock().unwrap();
            Ok(rows
                .iter()
                .rev()
                .filter(|r| &r.user_id == user_id)
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn test_records_audit_and_ping() {
        let repo = Arc::new(MemoryRepo::default());
        let recorder = ActivityRecorder::new(repo.clone());
        let user = UserId::new();

        recorder.audit(&user, "login", Some("password".into()), None).await;
        recorder.ping(&user, PingMethod::Api, None).await;

        let audits = AuditLogRepository::list_for_user(repo.as_ref(), &user, 10)
            .await
            .unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].action, "login");
        assert_eq!(audits[0].details.as_deref(), Some("password"));

        let pings = PingHistoryRepository::list_for_user(repo.as_ref(), &user, 10)
            .await
            .unwrap();
        assert_eq!(pings.len(), 1);
        assert_eq!(pings[0].method, PingMethod::Api);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let repo = Arc::new(MemoryRepo {
            fail: true,
            ..Default::default()
        });
        let recorder = ActivityRecorder::new(repo.clone());
        let user = UserId::new();

        recorder.audit(&user, "check_in", None, None).await;
        recorder.ping(&user, PingMethod::Web, None).await;

        assert!(repo.audits.lock().unwrap().is_empty());
        assert!(repo.pings.lock().unwrap().is_empty());
    }
}
