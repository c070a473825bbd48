//! Secrets Use Case
//!
//! Content is sealed under the master key before it reaches storage and
//! opened only for the owner or a released recipient.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use chrono::Utc;
use kernel::error::app_error::ResultExt;
use kernel::error::kind::ErrorKind;
use kernel::id::{SecretId, UserId};
use platform::client::ClientFingerprint;

use crate::application::config::VaultConfig;
use crate::application::settings::load_or_init;
use crate::domain::entity::secret::{Secret, validate_content, validate_name};
use crate::domain::repository::{
    AssignmentRepository, QuestionSetRepository, SecretRepository, SettingsRepository,
};
use crate::domain::services;
use crate::error::{VaultError, VaultResult};

pub struct SecretInput {
    pub name: String,
    pub content: String,
}

/// A secret with its content opened
pub struct SecretDetails {
    pub secret: Secret,
    pub content: String,
}

/// Result of replacing a secret's content
pub struct SecretUpdate {
    pub secret: Secret,
    /// Question sets removed because they sealed the previous content
    pub cleared_question_sets: usize,
}

/// Load a secret owned by `user_id`
pub(crate) async fn owned_secret<R>(repo: &R, user_id: &UserId, id: &SecretId) -> VaultResult<Secret>
where
    R: SecretRepository + Sync,
{
    let secret = SecretRepository::find_by_id(repo, id)
        .await?
        .ok_or(VaultError::NotFound("Secret"))?;
    if !secret.is_owned_by(user_id) {
        return Err(VaultError::NotOwner);
    }
    Ok(secret)
}

pub(crate) fn open_secret(config: &VaultConfig, secret: &Secret) -> VaultResult<String> {
    let plain = services::open_content(&config.master_key, &secret.id, &secret.sealed_content)?;
    let content = String::from_utf8(plain.to_vec())
        .map_app_err(ErrorKind::InternalServerError, "Secret content is not UTF-8")?;
    Ok(content)
}

pub struct SecretsUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    config: Arc<VaultConfig>,
}

impl<R, L> SecretsUseCase<R, L>
where
    R: SecretRepository
        + AssignmentRepository
        + QuestionSetRepository
        + SettingsRepository
        + Send
        + Sync,
    L: ActivityStore,
{
    pub fn new(repo: Arc<R>, activity: ActivityRecorder<L>, config: Arc<VaultConfig>) -> Self {
        Self {
            repo,
            activity,
            config,
        }
    }

    pub async fn list(&self, user_id: &UserId) -> VaultResult<Vec<Secret>> {
        SecretRepository::list_for_user(self.repo.as_ref(), user_id).await
    }

    pub async fn create(
        &self,
        user_id: &UserId,
        input: SecretInput,
        client: &ClientFingerprint,
    ) -> VaultResult<Secret> {
        let name = validate_name(&input.name)?;
        validate_content(&input.content)?;

        let mut secret = Secret::new(*user_id, name);
        secret.sealed_content =
            services::seal_content(&self.config.master_key, &secret.id, input.content.as_bytes())?;
        SecretRepository::create(self.repo.as_ref(), &secret).await?;
        // The switch is armed from the first stored secret
        load_or_init(self.repo.as_ref(), user_id, Utc::now()).await?;

        self.activity
            .audit(
                user_id,
                actions::SECRET_CREATED,
                Some(secret.name.clone()),
                Some(client),
            )
            .await;
        tracing::info!(user_id = %user_id, secret_id = %secret.id, "Secret created");
        Ok(secret)
    }

    pub async fn get(&self, user_id: &UserId, id: &SecretId) -> VaultResult<SecretDetails> {
        let secret = owned_secret(self.repo.as_ref(), user_id, id).await?;
        let content = open_secret(&self.config, &secret)?;
        Ok(SecretDetails { secret, content })
    }

    /// Replaces name and content. Question sets of the secret's assignments
    /// sealed the old content and are removed; the owner re-creates them.
    pub async fn update(
        &self,
        user_id: &UserId,
        id: &SecretId,
        input: SecretInput,
        client: &ClientFingerprint,
    ) -> VaultResult<SecretUpdate> {
        let mut secret = owned_secret(self.repo.as_ref(), user_id, id).await?;
        let name = validate_name(&input.name)?;
        validate_content(&input.content)?;

        secret.name = name;
        secret.sealed_content =
            services::seal_content(&self.config.master_key, &secret.id, input.content.as_bytes())?;
        secret.updated_at = Utc::now();
        SecretRepository::update(self.repo.as_ref(), &secret).await?;

        let mut cleared_question_sets = 0usize;
        for assignment in self.repo.list_for_secret(id).await? {
            if self.repo.delete_by_assignment(&assignment.id).await? {
                cleared_question_sets += 1;
            }
        }

        let details = match cleared_question_sets {
            0 => secret.name.clone(),
            n => format!("{} ({n} question sets cleared)", secret.name),
        };
        self.activity
            .audit(user_id, actions::SECRET_UPDATED, Some(details), Some(client))
            .await;
        tracing::info!(
            user_id = %user_id,
            secret_id = %id,
            cleared_question_sets,
            "Secret updated"
        );
        Ok(SecretUpdate {
            secret,
            cleared_question_sets,
        })
    }

    /// Removes the secret along with its assignments and question sets
    pub async fn delete(
        &self,
        user_id: &UserId,
        id: &SecretId,
        client: &ClientFingerprint,
    ) -> VaultResult<()> {
        let secret = owned_secret(self.repo.as_ref(), user_id, id).await?;

        for assignment in self.repo.list_for_secret(id).await? {
            self.repo.delete_by_assignment(&assignment.id).await?;
            AssignmentRepository::delete(self.repo.as_ref(), &assignment.id).await?;
        }
        SecretRepository::delete(self.repo.as_ref(), id).await?;

        self.activity
            .audit(
                user_id,
                actions::SECRET_DELETED,
                Some(secret.name),
                Some(client),
            )
            .await;
        tracing::info!(user_id = %user_id, secret_id = %id, "Secret deleted");
        Ok(())
    }
}
