//! Dashboard Use Case

use std::sync::Arc;

use activity::{AuditLog, AuditLogRepository, PingHistory, PingHistoryRepository};
use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::application::settings::load_or_init;
use crate::domain::entity::settings::{SwitchSettings, SwitchStatus};
use crate::domain::repository::{
    AssignmentRepository, RecipientRepository, SecretRepository, SettingsRepository,
};
use crate::error::VaultResult;

const RECENT_ACTIVITY: i64 = 10;
const RECENT_PINGS: i64 = 5;
const PING_HISTORY: i64 = 50;

pub struct DashboardOverview {
    pub settings: SwitchSettings,
    pub status: SwitchStatus,
    pub next_deadline: DateTime<Utc>,
    pub release_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub secret_count: i64,
    pub recipient_count: i64,
    pub assignment_count: i64,
    pub recent_activity: Vec<AuditLog>,
    pub recent_pings: Vec<PingHistory>,
}

pub struct DashboardUseCase<R, L> {
    repo: Arc<R>,
    activity: Arc<L>,
}

impl<R, L> DashboardUseCase<R, L>
where
    R: SecretRepository
        + RecipientRepository
        + AssignmentRepository
        + SettingsRepository
        + Send
        + Sync,
    L: AuditLogRepository + PingHistoryRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, activity: Arc<L>) -> Self {
        Self { repo, activity }
    }

    pub async fn overview(&self, user_id: &UserId) -> VaultResult<DashboardOverview> {
        let now = Utc::now();
        let repo = self.repo.as_ref();
        let settings = load_or_init(repo, user_id, now).await?;

        let secret_count = SecretRepository::count_for_user(repo, user_id).await?;
        let recipient_count = RecipientRepository::count_for_user(repo, user_id).await?;
        let assignment_count = AssignmentRepository::count_for_user(repo, user_id).await?;

        let recent_activity =
            AuditLogRepository::list_for_user(self.activity.as_ref(), user_id, RECENT_ACTIVITY)
                .await?;
        let recent_pings =
            PingHistoryRepository::list_for_user(self.activity.as_ref(), user_id, RECENT_PINGS)
                .await?;

        Ok(DashboardOverview {
            status: settings.status(now),
            next_deadline: settings.deadline(),
            release_at: settings.release_at(),
            days_remaining: settings.days_remaining(now),
            settings,
            secret_count,
            recipient_count,
            assignment_count,
            recent_activity,
            recent_pings,
        })
    }

    /// Newest first
    pub async fn pings(&self, user_id: &UserId) -> VaultResult<Vec<PingHistory>> {
        Ok(
            PingHistoryRepository::list_for_user(self.activity.as_ref(), user_id, PING_HISTORY)
                .await?,
        )
    }
}
