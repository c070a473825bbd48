//! Repository Traits

use kernel::id::UserId;

use crate::domain::entity::{AuditLog, PingHistory};
use crate::error::ActivityResult;

#[trait_variant::make(AuditLogRepository: Send)]
pub trait LocalAuditLogRepository {
    async fn record(&self, entry: &AuditLog) -> ActivityResult<()>;

    /// Newest first
    async fn list_for_user(&self, user_id: &UserId, limit: i64) -> ActivityResult<Vec<AuditLog>>;
}

#[trait_variant::make(PingHistoryRepository: Send)]
pub trait LocalPingHistoryRepository {
    async fn record(&self, ping: &PingHistory) -> ActivityResult<()>;

    /// Newest first
    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> ActivityResult<Vec<PingHistory>>;
}

/// Storage for both activity streams
pub trait ActivityStore: AuditLogRepository + PingHistoryRepository + Send + Sync + 'static {}

impl<T> ActivityStore for T where T: AuditLogRepository + PingHistoryRepository + Send + Sync + 'static {}
