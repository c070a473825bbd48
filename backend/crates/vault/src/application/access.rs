//! Recipient Access Use Case
//!
//! Unauthenticated: the access token in the URL is the only credential.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use chrono::{DateTime, Utc};
use platform::client::ClientFingerprint;
use platform::timelock::Beacon;

use crate::application::config::VaultConfig;
use crate::application::secrets::open_secret;
use crate::domain::entity::assignment::{SecretAssignment, hash_access_token};
use crate::domain::entity::secret::Secret;
use crate::domain::repository::{AssignmentRepository, QuestionSetRepository, SecretRepository};
use crate::domain::services::{self, UnlockParams};
use crate::error::{VaultError, VaultResult};

pub struct AccessView {
    pub secret_name: String,
    pub released: bool,
    /// Empty when the assignment has no question set
    pub questions: Vec<String>,
    pub threshold: Option<u8>,
    pub unlock_available_at: Option<DateTime<Utc>>,
}

pub struct UnlockedSecret {
    pub secret_name: String,
    pub content: String,
}

pub struct AccessUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    config: Arc<VaultConfig>,
    beacon: Arc<dyn Beacon>,
}

impl<R, L> AccessUseCase<R, L>
where
    R: SecretRepository + AssignmentRepository + QuestionSetRepository + Send + Sync,
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

    async fn resolve(&self, token: &str) -> VaultResult<(SecretAssignment, Secret)> {
        let assignment = self
            .repo
            .find_by_access_token_hash(&hash_access_token(token))
            .await?
            .ok_or(VaultError::NotFound("Access token"))?;
        let secret = SecretRepository::find_by_id(self.repo.as_ref(), &assignment.secret_id)
            .await?
            .ok_or(VaultError::NotFound("Secret"))?;
        Ok((assignment, secret))
    }

    pub async fn view(&self, token: &str) -> VaultResult<AccessView> {
        let (assignment, secret) = self.resolve(token).await?;
        let set = self.repo.find_by_assignment(&assignment.id).await?;

        let schedule = self.beacon.schedule();
        Ok(AccessView {
            secret_name: secret.name,
            released: assignment.is_released(),
            questions: set.as_ref().map(|s| s.prompts()).unwrap_or_default(),
            threshold: set.as_ref().map(|s| s.threshold),
            unlock_available_at: set.map(|s| schedule.round_datetime(s.timelock_round)),
        })
    }

    pub async fn unlock(
        &self,
        token: &str,
        answers: &[String],
        client: Option<&ClientFingerprint>,
    ) -> VaultResult<UnlockedSecret> {
        let (mut assignment, secret) = self.resolve(token).await?;
        if !assignment.is_released() {
            return Err(VaultError::NotYetReleased);
        }

        let now = Utc::now();
        if assignment.is_unlock_locked(now) {
            let until = assignment.unlock_locked_until.unwrap_or(now);
            return Err(VaultError::UnlockLocked { until });
        }

        let content = match self.repo.find_by_assignment(&assignment.id).await? {
            Some(set) => {
                let result = services::unlock_with_answers(
                    UnlockParams {
                        set_id: &set.id,
                        assignment_id: &assignment.id,
                        threshold: set.threshold,
                        recipient_ciphertext: &set.recipient_ciphertext,
                        timelocked_shares: &set.timelocked_shares,
                        answers,
                        now,
                    },
                    self.beacon.as_ref(),
                );
                let plain = match result {
                    Ok(plain) => plain,
                    Err(e) => {
                        if matches!(e, VaultError::InsufficientAnswers { .. }) {
                            assignment.record_unlock_failure(now);
                            self.repo.update_unlock_state(&assignment).await?;
                        }
                        tracing::info!(
                            assignment_id = %assignment.id,
                            error = %e,
                            "Secret unlock refused"
                        );
                        return Err(e);
                    }
                };
                if assignment.reset_unlock_failures() {
                    self.repo.update_unlock_state(&assignment).await?;
                }
                String::from_utf8(plain.to_vec())
                    .map_err(|_| VaultError::Crypto("Secret content is not UTF-8".to_string()))?
            }
            None => open_secret(&self.config, &secret)?,
        };

        self.activity
            .audit(
                &assignment.user_id,
                actions::SECRET_ACCESSED,
                Some(secret.name.clone()),
                client,
            )
            .await;
        tracing::info!(
            user_id = %assignment.user_id,
            assignment_id = %assignment.id,
            "Released secret accessed"
        );

        Ok(UnlockedSecret {
            secret_name: secret.name,
            content,
        })
    }
}
