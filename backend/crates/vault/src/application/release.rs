//! Release Scheduler
//!
//! Periodically finds switches whose grace period has run out, marks them
//! triggered, releases every pending assignment and notifies recipients.

use std::sync::Arc;
use std::time::Duration;

use activity::{ActivityRecorder, ActivityStore, actions};
use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, UserId};

use crate::domain::entity::settings::SwitchSettings;
use crate::domain::repository::{
    AssignmentRepository, RecipientRepository, SecretRepository, SettingsRepository,
};
use crate::error::VaultResult;

/// What a recipient is told when a secret is released to them.
/// The access token itself is never stored and so cannot be included.
#[derive(Debug, Clone)]
pub struct ReleaseNotice {
    pub owner_id: UserId,
    pub assignment_id: AssignmentId,
    pub recipient_name: String,
    pub recipient_email: String,
    pub secret_name: String,
    pub released_at: DateTime<Utc>,
}

#[trait_variant::make(Notifier: Send)]
pub trait LocalNotifier {
    async fn notify(&self, notice: &ReleaseNotice) -> VaultResult<()>;
}

/// Writes notices to the log instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, notice: &ReleaseNotice) -> VaultResult<()> {
        tracing::info!(
            owner_id = %notice.owner_id,
            assignment_id = %notice.assignment_id,
            recipient = %notice.recipient_email,
            recipient_name = %notice.recipient_name,
            secret = %notice.secret_name,
            released_at = %notice.released_at,
            "Secret released to recipient"
        );
        Ok(())
    }
}

pub struct ReleaseScheduler<R, L, N> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    notifier: Arc<N>,
    interval: Duration,
}

impl<R, L, N> ReleaseScheduler<R, L, N>
where
    R: SecretRepository
        + RecipientRepository
        + AssignmentRepository
        + SettingsRepository
        + Send
        + Sync,
    L: ActivityStore,
    N: Notifier + Send + Sync,
{
    pub fn new(
        repo: Arc<R>,
        activity: ActivityRecorder<L>,
        notifier: Arc<N>,
        interval: Duration,
    ) -> Self {
        Self {
            repo,
            activity,
            notifier,
            interval,
        }
    }

    /// Scan forever; the first scan runs immediately
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.interval.as_secs(), "Release scheduler started");

        loop {
            ticker.tick().await;
            match self.scan(Utc::now()).await {
                Ok(0) => tracing::debug!("Release scan found nothing due"),
                Ok(released) => tracing::info!(users = released, "Release scan complete"),
                Err(e) => tracing::error!(error = %e, "Release scan failed"),
            }
        }
    }

    /// Trigger every switch due at `now`; returns how many were triggered
    pub async fn scan(&self, now: DateTime<Utc>) -> VaultResult<usize> {
        let due = self.repo.find_due(now).await?;

        let mut triggered = 0;
        for settings in due {
            let user_id = settings.user_id;
            match self.trigger(settings, now).await {
                Ok(()) => triggered += 1,
                Err(e) => tracing::error!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to release secrets"
                ),
            }
        }
        Ok(triggered)
    }

    async fn trigger(&self, mut settings: SwitchSettings, now: DateTime<Utc>) -> VaultResult<()> {
        let user_id = settings.user_id;
        let pending: Vec<_> = AssignmentRepository::list_for_user(self.repo.as_ref(), &user_id)
            .await?
            .into_iter()
            .filter(|a| !a.is_released())
            .collect();

        settings.trigger(now);
        self.repo.save(&settings).await?;
        let released = self.repo.mark_released_for_user(&user_id, now).await?;

        self.activity
            .audit(
                &user_id,
                actions::SWITCH_TRIGGERED,
                Some(format!("{released} assignments released")),
                None,
            )
            .await;
        tracing::warn!(user_id = %user_id, released, "Dead man's switch triggered");

        for assignment in pending {
            let secret = SecretRepository::find_by_id(self.repo.as_ref(), &assignment.secret_id)
                .await?;
            let recipient =
                RecipientRepository::find_by_id(self.repo.as_ref(), &assignment.recipient_id)
                    .await?;
            let (Some(secret), Some(recipient)) = (secret, recipient) else {
                tracing::warn!(
                    assignment_id = %assignment.id,
                    "Released assignment lost its secret or recipient"
                );
                continue;
            };

            let notice = ReleaseNotice {
                owner_id: user_id,
                assignment_id: assignment.id,
                recipient_name: recipient.name,
                recipient_email: recipient.email,
                secret_name: secret.name,
                released_at: now,
            };
            if let Err(e) = self.notifier.notify(&notice).await {
                tracing::warn!(
                    assignment_id = %assignment.id,
                    error = %e,
                    "Failed to notify recipient"
                );
            }

            self.activity
                .audit(
                    &user_id,
                    actions::SECRET_RELEASED,
                    Some(format!("{} -> {}", notice.secret_name, notice.recipient_email)),
                    None,
                )
                .await;
        }
        Ok(())
    }
}
