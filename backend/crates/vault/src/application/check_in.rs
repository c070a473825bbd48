//! Check-in Use Case
//!
//! Proof of life: pushes the deadline forward, clears a triggered switch
//! and moves every question set's timelock to the new release moment.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, PingMethod, actions};
use chrono::Utc;
use kernel::id::UserId;
use platform::client::ClientFingerprint;
use platform::timelock::Beacon;

use crate::application::config::VaultConfig;
use crate::application::question_sets::rearm_for_user;
use crate::application::settings::load_or_init;
use crate::domain::entity::settings::SwitchSettings;
use crate::domain::repository::{QuestionSetRepository, SettingsRepository};
use crate::error::VaultResult;

pub struct CheckInUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    config: Arc<VaultConfig>,
    beacon: Arc<dyn Beacon>,
}

impl<R, L> CheckInUseCase<R, L>
where
    R: SettingsRepository + QuestionSetRepository + Send + Sync,
    L: ActivityStore,
{
    pub fn new(
        repo: Arc<R>,
        activity: ActivityRecorder<L>,
        config: Arc<VaultConfig>,
        beacon: Arc<dyn Beacon>,
    ) -> Self {
        Self {
            repo,
            activity,
            config,
            beacon,
        }
    }

    pub async fn execute(
        &self,
        user_id: &UserId,
        method: PingMethod,
        client: &ClientFingerprint,
    ) -> VaultResult<SwitchSettings> {
        let now = Utc::now();
        let mut settings = load_or_init(self.repo.as_ref(), user_id, now).await?;
        let was_triggered = settings.triggered_at.is_some();

        settings.check_in(now);
        self.repo.save(&settings).await?;

        self.activity.ping(user_id, method, Some(client)).await;
        self.activity
            .audit(
                user_id,
                actions::CHECK_IN,
                Some(method.to_string()),
                Some(client),
            )
            .await;

        let rearmed = rearm_for_user(
            self.repo.as_ref(),
            &self.config,
            self.beacon.as_ref(),
            user_id,
            settings.release_at(),
        )
        .await;

        tracing::info!(
            user_id = %user_id,
            method = %method,
            was_triggered,
            rearmed,
            next_deadline = %settings.deadline(),
            "Check-in recorded"
        );
        Ok(settings)
    }
}
