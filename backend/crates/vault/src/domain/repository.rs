//! Repository Traits
//!
//! Persistence interfaces; `infra::postgres` implements them. Every lookup
//! by id returns the row regardless of owner; ownership is checked by the
//! use cases so that "missing" and "not yours" stay distinguishable.

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, QuestionSetId, RecipientId, SecretId, UserId};

use crate::domain::entity::{
    assignment::SecretAssignment, question_set::SecretQuestionSet, recipient::Recipient,
    secret::Secret, settings::SwitchSettings,
};
use crate::error::VaultResult;

#[trait_variant::make(SecretRepository: Send)]
pub trait LocalSecretRepository {
    async fn create(&self, secret: &Secret) -> VaultResult<()>;

    async fn find_by_id(&self, id: &SecretId) -> VaultResult<Option<Secret>>;

    /// Newest first
    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<Secret>>;

    /// Persist name, sealed content and `updated_at`
    async fn update(&self, secret: &Secret) -> VaultResult<()>;

    async fn delete(&self, id: &SecretId) -> VaultResult<()>;

    async fn count_for_user(&self, user_id: &UserId) -> VaultResult<i64>;
}

#[trait_variant::make(RecipientRepository: Send)]
pub trait LocalRecipientRepository {
    async fn create(&self, recipient: &Recipient) -> VaultResult<()>;

    async fn find_by_id(&self, id: &RecipientId) -> VaultResult<Option<Recipient>>;

    /// Alphabetical by name
    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<Recipient>>;

    async fn update(&self, recipient: &Recipient) -> VaultResult<()>;

    async fn delete(&self, id: &RecipientId) -> VaultResult<()>;

    async fn count_for_user(&self, user_id: &UserId) -> VaultResult<i64>;
}

#[trait_variant::make(AssignmentRepository: Send)]
pub trait LocalAssignmentRepository {
    async fn create(&self, assignment: &SecretAssignment) -> VaultResult<()>;

    async fn find_by_id(&self, id: &AssignmentId) -> VaultResult<Option<SecretAssignment>>;

    async fn find_by_access_token_hash(
        &self,
        token_hash: &[u8],
    ) -> VaultResult<Option<SecretAssignment>>;

    async fn exists(&self, secret_id: &SecretId, recipient_id: &RecipientId) -> VaultResult<bool>;

    async fn list_for_secret(&self, secret_id: &SecretId) -> VaultResult<Vec<SecretAssignment>>;

    async fn list_for_recipient(
        &self,
        recipient_id: &RecipientId,
    ) -> VaultResult<Vec<SecretAssignment>>;

    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<SecretAssignment>>;

    async fn count_for_user(&self, user_id: &UserId) -> VaultResult<i64>;

    async fn delete(&self, id: &AssignmentId) -> VaultResult<()>;

    /// Sets `released_at` on every unreleased assignment of the user
    async fn mark_released_for_user(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> VaultResult<u64>;

    /// Persist the failed-unlock counter and lockout
    async fn update_unlock_state(&self, assignment: &SecretAssignment) -> VaultResult<()>;
}

#[trait_variant::make(QuestionSetRepository: Send)]
pub trait LocalQuestionSetRepository {
    /// Replaces any set already attached to the assignment
    async fn upsert(&self, set: &SecretQuestionSet) -> VaultResult<()>;

    async fn find_by_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> VaultResult<Option<SecretQuestionSet>>;

    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<SecretQuestionSet>>;

    async fn update_timelock(
        &self,
        id: &QuestionSetId,
        round: u64,
        timelocked_shares: &[u8],
    ) -> VaultResult<()>;

    /// Returns whether a set was removed
    async fn delete_by_assignment(&self, assignment_id: &AssignmentId) -> VaultResult<bool>;
}

#[trait_variant::make(SettingsRepository: Send)]
pub trait LocalSettingsRepository {
    async fn find(&self, user_id: &UserId) -> VaultResult<Option<SwitchSettings>>;

    /// Insert or replace
    async fn save(&self, settings: &SwitchSettings) -> VaultResult<()>;

    /// Untriggered switches whose grace period ended before `now`. Users
    /// with assignments but no row count from account creation with
    /// default settings.
    async fn find_due(&self, now: DateTime<Utc>) -> VaultResult<Vec<SwitchSettings>>;

    /// Registration time of the account, `None` for an unknown user
    async fn account_created_at(&self, user_id: &UserId) -> VaultResult<Option<DateTime<Utc>>>;
}

/// Everything the vault use cases need from storage
pub trait VaultStore:
    SecretRepository
    + RecipientRepository
    + AssignmentRepository
    + QuestionSetRepository
    + SettingsRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> VaultStore for T where
    T: SecretRepository
        + RecipientRepository
        + AssignmentRepository
        + QuestionSetRepository
        + SettingsRepository
        + Send
        + Sync
        + 'static
{
}
