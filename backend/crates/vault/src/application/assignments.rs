//! Assignments Use Case
//!
//! Linking a secret to a recipient mints the recipient's access token. The
//! token is returned exactly once; only its SHA-256 is stored.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use kernel::id::{AssignmentId, RecipientId, SecretId, UserId};
use platform::client::ClientFingerprint;

use crate::application::recipients::owned_recipient;
use crate::application::secrets::owned_secret;
use crate::application::settings::load_or_init;
use crate::domain::entity::assignment::SecretAssignment;
use crate::domain::entity::recipient::Recipient;
use crate::domain::repository::{
    AssignmentRepository, QuestionSetRepository, RecipientRepository, SecretRepository,
    SettingsRepository,
};
use crate::error::{VaultError, VaultResult};

pub struct NewAssignment {
    pub assignment: SecretAssignment,
    pub recipient: Recipient,
    /// Shown once; hand it to the recipient out of band
    pub access_token: String,
}

pub struct AssignmentSummary {
    pub assignment: SecretAssignment,
    pub recipient: Option<Recipient>,
    pub has_questions: bool,
}

pub(crate) async fn owned_assignment<R>(
    repo: &R,
    user_id: &UserId,
    id: &AssignmentId,
) -> VaultResult<SecretAssignment>
where
    R: AssignmentRepository + Sync,
{
    let assignment = AssignmentRepository::find_by_id(repo, id)
        .await?
        .ok_or(VaultError::NotFound("Assignment"))?;
    if !assignment.is_owned_by(user_id) {
        return Err(VaultError::NotOwner);
    }
    Ok(assignment)
}

pub struct AssignmentsUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
}

impl<R, L> AssignmentsUseCase<R, L>
where
    R: SecretRepository
        + RecipientRepository
        + AssignmentRepository
        + QuestionSetRepository
        + SettingsRepository
        + Send
        + Sync,
    L: ActivityStore,
{
    pub fn new(repo: Arc<R>, activity: ActivityRecorder<L>) -> Self {
        Self { repo, activity }
    }

    pub async fn assign(
        &self,
        user_id: &UserId,
        secret_id: &SecretId,
        recipient_id: &RecipientId,
        client: &ClientFingerprint,
    ) -> VaultResult<NewAssignment> {
        let secret = owned_secret(self.repo.as_ref(), user_id, secret_id).await?;
        let recipient = owned_recipient(self.repo.as_ref(), user_id, recipient_id).await?;

        if self.repo.exists(secret_id, recipient_id).await? {
            return Err(VaultError::AlreadyAssigned);
        }

        let (assignment, access_token) = SecretAssignment::new(*user_id, *secret_id, *recipient_id);
        AssignmentRepository::create(self.repo.as_ref(), &assignment).await?;
        load_or_init(self.repo.as_ref(), user_id, chrono::Utc::now()).await?;

        self.activity
            .audit(
                user_id,
                actions::ASSIGNMENT_CREATED,
                Some(format!("{} -> {}", secret.name, recipient.email)),
                Some(client),
            )
            .await;
        tracing::info!(
            user_id = %user_id,
            assignment_id = %assignment.id,
            secret_id = %secret_id,
            recipient_id = %recipient_id,
            "Secret assigned"
        );

        Ok(NewAssignment {
            assignment,
            recipient,
            access_token,
        })
    }

    pub async fn list_for_secret(
        &self,
        user_id: &UserId,
        secret_id: &SecretId,
    ) -> VaultResult<Vec<AssignmentSummary>> {
        owned_secret(self.repo.as_ref(), user_id, secret_id).await?;

        let assignments = self.repo.list_for_secret(secret_id).await?;
        let mut out = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let recipient =
                RecipientRepository::find_by_id(self.repo.as_ref(), &assignment.recipient_id)
                    .await?;
            let has_questions = self.repo.find_by_assignment(&assignment.id).await?.is_some();
            out.push(AssignmentSummary {
                assignment,
                recipient,
                has_questions,
            });
        }
        Ok(out)
    }

    /// Removes the assignment and its question set
    pub async fn unassign(
        &self,
        user_id: &UserId,
        id: &AssignmentId,
        client: &ClientFingerprint,
    ) -> VaultResult<()> {
        owned_assignment(self.repo.as_ref(), user_id, id).await?;

        self.repo.delete_by_assignment(id).await?;
        AssignmentRepository::delete(self.repo.as_ref(), id).await?;

        self.activity
            .audit(user_id, actions::ASSIGNMENT_DELETED, None, Some(client))
            .await;
        tracing::info!(user_id = %user_id, assignment_id = %id, "Assignment removed");
        Ok(())
    }
}
