//! Question Sets Use Case

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, QuestionSetId, UserId};
use platform::client::ClientFingerprint;
use platform::timelock::Beacon;

use crate::application::assignments::owned_assignment;
use crate::application::config::VaultConfig;
use crate::application::settings::load_or_init;
use crate::domain::entity::question_set::{QuestionAnswer, SecretQuestionSet, validate_questions};
use crate::domain::repository::{
    AssignmentRepository, QuestionSetRepository, SecretRepository, SettingsRepository,
};
use crate::domain::services::{self, LockParams};
use crate::error::{VaultError, VaultResult};

/// Re-lock every question set of the user to the round of `deadline`.
/// A set that fails is logged and keeps its previous round.
pub(crate) async fn rearm_for_user<R, B>(
    repo: &R,
    config: &VaultConfig,
    beacon: &B,
    user_id: &UserId,
    deadline: DateTime<Utc>,
) -> usize
where
    R: QuestionSetRepository + Sync,
    B: Beacon + ?Sized,
{
    let sets = match QuestionSetRepository::list_for_user(repo, user_id).await {
        Ok(sets) => sets,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to list question sets");
            return 0;
        }
    };

    let mut rearmed = 0;
    for set in sets {
        let relocked =
            services::relock(&set.id, &set.sealed_shares, deadline, &config.master_key, beacon);
        let result = match relocked {
            Ok((round, timelocked)) => repo.update_timelock(&set.id, round, &timelocked).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => rearmed += 1,
            Err(e) => tracing::error!(
                user_id = %user_id,
                question_set_id = %set.id,
                error = %e,
                "Failed to re-arm question set"
            ),
        }
    }
    rearmed
}

pub struct QuestionSetInput {
    pub threshold: u8,
    pub questions: Vec<QuestionAnswer>,
}

pub struct QuestionSetsUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    config: Arc<VaultConfig>,
    beacon: Arc<dyn Beacon>,
}

impl<R, L> QuestionSetsUseCase<R, L>
where
    R: SecretRepository
        + AssignmentRepository
        + QuestionSetRepository
        + SettingsRepository
        + Send
        + Sync,
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

    /// Builds a new set for the assignment, replacing any existing one
    pub async fn create(
        &self,
        user_id: &UserId,
        assignment_id: &AssignmentId,
        input: QuestionSetInput,
        client: &ClientFingerprint,
    ) -> VaultResult<SecretQuestionSet> {
        let assignment = owned_assignment(self.repo.as_ref(), user_id, assignment_id).await?;
        validate_questions(input.threshold, &input.questions)?;

        let secret = SecretRepository::find_by_id(self.repo.as_ref(), &assignment.secret_id)
            .await?
            .ok_or(VaultError::NotFound("Secret"))?;
        let plaintext =
            services::open_content(&self.config.master_key, &secret.id, &secret.sealed_content)?;

        let now = Utc::now();
        let settings = load_or_init(self.repo.as_ref(), user_id, now).await?;

        let set_id = QuestionSetId::new();
        let lock = services::lock_with_questions(
            LockParams {
                set_id: &set_id,
                assignment_id,
                threshold: input.threshold,
                pairs: &input.questions,
                plaintext: &plaintext,
                deadline: settings.release_at(),
            },
            &self.config.master_key,
            self.beacon.as_ref(),
        )?;

        let set = SecretQuestionSet {
            id: set_id,
            user_id: *user_id,
            assignment_id: *assignment_id,
            threshold: input.threshold,
            questions: lock.questions,
            recipient_ciphertext: lock.recipient_ciphertext,
            sealed_shares: lock.sealed_shares,
            timelock_round: lock.timelock_round,
            timelocked_shares: lock.timelocked_shares,
            created_at: now,
            updated_at: now,
        };
        self.repo.upsert(&set).await?;

        self.activity
            .audit(
                user_id,
                actions::QUESTION_SET_CREATED,
                Some(format!(
                    "{} of {} answers required",
                    set.threshold,
                    set.questions.len()
                )),
                Some(client),
            )
            .await;
        tracing::info!(
            user_id = %user_id,
            assignment_id = %assignment_id,
            threshold = set.threshold,
            questions = set.questions.len(),
            round = set.timelock_round,
            "Question set created"
        );
        Ok(set)
    }

    pub async fn get(
        &self,
        user_id: &UserId,
        assignment_id: &AssignmentId,
    ) -> VaultResult<SecretQuestionSet> {
        owned_assignment(self.repo.as_ref(), user_id, assignment_id).await?;
        self.repo
            .find_by_assignment(assignment_id)
            .await?
            .ok_or(VaultError::NotFound("Question set"))
    }

    pub async fn delete(
        &self,
        user_id: &UserId,
        assignment_id: &AssignmentId,
        client: &ClientFingerprint,
    ) -> VaultResult<()> {
        owned_assignment(self.repo.as_ref(), user_id, assignment_id).await?;
        if !self.repo.delete_by_assignment(assignment_id).await? {
            return Err(VaultError::NotFound("Question set"));
        }

        self.activity
            .audit(user_id, actions::QUESTION_SET_DELETED, None, Some(client))
            .await;
        tracing::info!(user_id = %user_id, assignment_id = %assignment_id, "Question set deleted");
        Ok(())
    }
}
