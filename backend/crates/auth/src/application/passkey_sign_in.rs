//! Passkey Sign In Use Case
//!
//! Passwordless login. A passkey assertion replaces both password and TOTP.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use platform::client::ClientFingerprint;
use uuid::Uuid;
use webauthn_rs::prelude::{PublicKeyCredential, RequestChallengeResponse};

use crate::application::config::AuthConfig;
use crate::application::passkeys::{PasskeyError, PasskeyService};
use crate::application::sign_in::{SignInOutput, start_session};
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, PasskeyRepository, UserRepository,
};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct PasskeySignInUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    passkeys: Arc<PasskeyService>,
    config: Arc<AuthConfig>,
}

impl<R, L> PasskeySignInUseCase<R, L>
where
    R: UserRepository + AuthRepository + AuthSessionRepository + PasskeyRepository + Send + Sync,
    L: ActivityStore,
{
    pub fn new(
        repo: Arc<R>,
        activity: ActivityRecorder<L>,
        passkeys: Arc<PasskeyService>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            activity,
            passkeys,
            config,
        }
    }

    pub async fn begin(&self, email: &str) -> AuthResult<(Uuid, RequestChallengeResponse)> {
        let email = Email::new(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let passkeys: Vec<_> =
            PasskeyRepository::list_for_user(self.repo.as_ref(), &user.user_id)
                .await?
                .into_iter()
                .map(|c| c.passkey)
                .collect();

        let started = self
            .passkeys
            .authenticate_begin(user.user_id, &passkeys)
            .await?;
        Ok(started)
    }

    pub async fn finish(
        &self,
        authentication_id: Uuid,
        response: &PublicKeyCredential,
        client: &ClientFingerprint,
    ) -> AuthResult<SignInOutput> {
        let (user_id, result) = self
            .passkeys
            .authenticate_finish(authentication_id, response)
            .await?;

        let mut credential = self
            .repo
            .find_by_credential_id(result.cred_id().as_slice())
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or(PasskeyError::UnknownCredential)?;
        credential.record_use(&result);
        PasskeyRepository::update(self.repo.as_ref(), &credential).await?;

        let user = UserRepository::find_by_id(self.repo.as_ref(), &user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let locked = self
            .repo
            .find_by_user_id(&user_id)
            .await?
            .is_some_and(|auth| auth.is_locked());
        if locked {
            return Err(AuthError::AccountLocked);
        }

        let (session, session_token) =
            start_session(self.repo.as_ref(), &self.config, user, false, client).await?;

        self.activity
            .audit(&user_id, actions::LOGIN_PASSKEY, None, Some(client))
            .await;

        tracing::info!(
            user_id = %user_id,
            session_id = %session.session_id,
            "User signed in with passkey"
        );

        Ok(SignInOutput {
            session_token,
            requires_2fa: false,
            public_id: session.public_id.to_string(),
            expires_at_ms: session.expires_at_ms,
        })
    }
}
