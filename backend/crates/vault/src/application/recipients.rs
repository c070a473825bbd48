//! Recipients Use Case

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use kernel::id::{RecipientId, UserId};
use platform::client::ClientFingerprint;

use crate::domain::entity::recipient::{Recipient, RecipientFields};
use crate::domain::repository::{
    AssignmentRepository, QuestionSetRepository, RecipientRepository,
};
use crate::error::{VaultError, VaultResult};

pub struct RecipientInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl RecipientInput {
    fn parse(&self) -> VaultResult<RecipientFields> {
        RecipientFields::parse(&self.name, &self.email, self.phone.as_deref())
    }
}

pub(crate) async fn owned_recipient<R>(
    repo: &R,
    user_id: &UserId,
    id: &RecipientId,
) -> VaultResult<Recipient>
where
    R: RecipientRepository + Sync,
{
    let recipient = RecipientRepository::find_by_id(repo, id)
        .await?
        .ok_or(VaultError::NotFound("Recipient"))?;
    if !recipient.is_owned_by(user_id) {
        return Err(VaultError::NotOwner);
    }
    Ok(recipient)
}

pub struct RecipientsUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
}

impl<R, L> RecipientsUseCase<R, L>
where
    R: RecipientRepository + AssignmentRepository + QuestionSetRepository + Send + Sync,
    L: ActivityStore,
{
    pub fn new(repo: Arc<R>, activity: ActivityRecorder<L>) -> Self {
        Self { repo, activity }
    }

    pub async fn list(&self, user_id: &UserId) -> VaultResult<Vec<Recipient>> {
        RecipientRepository::list_for_user(self.repo.as_ref(), user_id).await
    }

    pub async fn create(
        &self,
        user_id: &UserId,
        input: RecipientInput,
        client: &ClientFingerprint,
    ) -> VaultResult<Recipient> {
        let recipient = Recipient::new(*user_id, input.parse()?);
        RecipientRepository::create(self.repo.as_ref(), &recipient).await?;

        self.activity
            .audit(
                user_id,
                actions::RECIPIENT_CREATED,
                Some(recipient.email.clone()),
                Some(client),
            )
            .await;
        tracing::info!(user_id = %user_id, recipient_id = %recipient.id, "Recipient created");
        Ok(recipient)
    }

    pub async fn get(&self, user_id: &UserId, id: &RecipientId) -> VaultResult<Recipient> {
        owned_recipient(self.repo.as_ref(), user_id, id).await
    }

    pub async fn update(
        &self,
        user_id: &UserId,
        id: &RecipientId,
        input: RecipientInput,
        client: &ClientFingerprint,
    ) -> VaultResult<Recipient> {
        let mut recipient = owned_recipient(self.repo.as_ref(), user_id, id).await?;
        recipient.apply(input.parse()?);
        RecipientRepository::update(self.repo.as_ref(), &recipient).await?;

        self.activity
            .audit(
                user_id,
                actions::RECIPIENT_UPDATED,
                Some(recipient.email.clone()),
                Some(client),
            )
            .await;
        tracing::info!(user_id = %user_id, recipient_id = %id, "Recipient updated");
        Ok(recipient)
    }

    /// Removes the recipient along with its assignments and question sets
    pub async fn delete(
        &self,
        user_id: &UserId,
        id: &RecipientId,
        client: &ClientFingerprint,
    ) -> VaultResult<()> {
        let recipient = owned_recipient(self.repo.as_ref(), user_id, id).await?;

        for assignment in self.repo.list_for_recipient(id).await? {
            self.repo.delete_by_assignment(&assignment.id).await?;
            AssignmentRepository::delete(self.repo.as_ref(), &assignment.id).await?;
        }
        RecipientRepository::delete(self.repo.as_ref(), id).await?;

        self.activity
            .audit(
                user_id,
                actions::RECIPIENT_DELETED,
                Some(recipient.email),
                Some(client),
            )
            .await;
        tracing::info!(user_id = %user_id, recipient_id = %id, "Recipient deleted");
        Ok(())
    }
}
