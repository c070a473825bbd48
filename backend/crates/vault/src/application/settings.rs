//! Switch Settings Use Case

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::client::ClientFingerprint;
use platform::timelock::Beacon;

use crate::application::config::VaultConfig;
use crate::application::question_sets::rearm_for_user;
use crate::domain::entity::settings::SwitchSettings;
use crate::domain::repository::{QuestionSetRepository, SettingsRepository};
use crate::error::VaultResult;

/// Settings row of the user, created with defaults on first access.
/// A user who never checked in counts from account creation.
pub(crate) async fn load_or_init<R>(
    repo: &R,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> VaultResult<SwitchSettings>
where
    R: SettingsRepository + Sync,
{
    if let Some(settings) = repo.find(user_id).await? {
        return Ok(settings);
    }

    let mut settings = SwitchSettings::new(*user_id, now);
    if let Some(created_at) = repo.account_created_at(user_id).await? {
        settings.last_check_in_at = created_at.min(now);
    }
    repo.save(&settings).await?;
    tracing::debug!(user_id = %user_id, "Switch settings initialized");
    Ok(settings)
}

pub struct SettingsUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    config: Arc<VaultConfig>,
    beacon: Arc<dyn Beacon>,
}

impl<R, L> SettingsUseCase<R, L>
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

    pub async fn get(&self, user_id: &UserId) -> VaultResult<SwitchSettings> {
        load_or_init(self.repo.as_ref(), user_id, Utc::now()).await
    }

    pub async fn update(
        &self,
        user_id: &UserId,
        interval_days: i32,
        grace_days: i32,
        client: &ClientFingerprint,
    ) -> VaultResult<SwitchSettings> {
        let mut settings = load_or_init(self.repo.as_ref(), user_id, Utc::now()).await?;
        settings.update_schedule(interval_days, grace_days)?;
        self.repo.save(&settings).await?;

        // The release moment moved with the schedule
        rearm_for_user(
            self.repo.as_ref(),
            &self.config,
            self.beacon.as_ref(),
            user_id,
            settings.release_at(),
        )
        .await;

        self.activity
            .audit(
                user_id,
                actions::SETTINGS_UPDATED,
                Some(format!(
                    "interval {interval_days}d, grace {grace_days}d"
                )),
                Some(client),
            )
            .await;
        tracing::info!(
            user_id = %user_id,
            interval_days,
            grace_days,
            "Switch settings updated"
        );
        Ok(settings)
    }
}
