//! Passkey Setup Use Case
//!
//! Registering, listing and removing passkeys for the signed-in user.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use kernel::error::app_error::AppError;
use kernel::id::UserId;
use platform::client::ClientFingerprint;
use uuid::Uuid;
use webauthn_rs::prelude::{CreationChallengeResponse, RegisterPublicKeyCredential};

use crate::application::passkeys::PasskeyService;
use crate::domain::entity::passkey::PasskeyCredential;
use crate::domain::repository::{PasskeyRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct PasskeyRegistrationInput {
    pub registration_id: Uuid,
    pub label: String,
    pub credential: RegisterPublicKeyCredential,
}

pub struct PasskeySetupUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    passkeys: Arc<PasskeyService>,
}

impl<R, L> PasskeySetupUseCase<R, L>
where
    R: UserRepository + PasskeyRepository + Send + Sync,
    L: ActivityStore,
{
    pub fn new(repo: Arc<R>, activity: ActivityRecorder<L>, passkeys: Arc<PasskeyService>) -> Self {
        Self {
            repo,
            activity,
            passkeys,
        }
    }

    pub async fn list(&self, user_id: &UserId) -> AuthResult<Vec<PasskeyCredential>> {
        PasskeyRepository::list_for_user(self.repo.as_ref(), user_id).await
    }

    pub async fn register_begin(
        &self,
        user_id: &UserId,
        session_id: Uuid,
    ) -> AuthResult<(Uuid, CreationChallengeResponse)> {
        let user = UserRepository::find_by_id(self.repo.as_ref(), user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let existing = PasskeyRepository::list_for_user(self.repo.as_ref(), user_id).await?;

        let started = self
            .passkeys
            .register_begin(*user_id, user.email.as_str(), session_id, &existing)
            .await?;
        Ok(started)
    }

    pub async fn register_finish(
        &self,
        user_id: &UserId,
        session_id: Uuid,
        input: PasskeyRegistrationInput,
        client: &ClientFingerprint,
    ) -> AuthResult<PasskeyCredential> {
        let passkey = self
            .passkeys
            .register_finish(input.registration_id, user_id, session_id, &input.credential)
            .await?;

        let credential = PasskeyCredential::new(*user_id, &input.label, passkey);
        if self
            .repo
            .find_by_credential_id(&credential.credential_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Passkey is already registered").into());
        }
        PasskeyRepository::create(self.repo.as_ref(), &credential).await?;

        self.activity
            .audit(
                user_id,
                actions::PASSKEY_ADDED,
                Some(credential.label.clone()),
                Some(client),
            )
            .await;

        tracing::info!(user_id = %user_id, label = %credential.label, "Passkey registered");
        Ok(credential)
    }

    /// Removing a passkey the user does not own is reported as unauthorized
    pub async fn delete(
        &self,
        user_id: &UserId,
        credential_id: &[u8],
        client: &ClientFingerprint,
    ) -> AuthResult<()> {
        if !PasskeyRepository::delete(self.repo.as_ref(), user_id, credential_id).await? {
            return Err(AuthError::NotOwner);
        }

        self.activity
            .audit(user_id, actions::PASSKEY_REMOVED, None, Some(client))
            .await;

        tracing::info!(user_id = %user_id, "Passkey removed");
        Ok(())
    }
}
