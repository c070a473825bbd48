//! Sign Up Use Case
//!
//! Creates a user and its password credentials.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use platform::client::ClientFingerprint;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth::Auth, user::User};
use crate::domain::repository::{AuthRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub email: String,
    pub password: String,
}

pub struct SignUpOutput {
    pub public_id: String,
}

pub struct SignUpUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    config: Arc<AuthConfig>,
}

impl<R, L> SignUpUseCase<R, L>
where
    R: UserRepository + AuthRepository + Send + Sync,
    L: ActivityStore,
{
    pub fn new(repo: Arc<R>, activity: ActivityRecorder<L>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            activity,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignUpInput,
        client: &ClientFingerprint,
    ) -> AuthResult<SignUpOutput> {
        let email = Email::new(&input.email)?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let user = User::new(email);
        let auth = Auth::new(user.user_id, password_hash);

        UserRepository::create(self.repo.as_ref(), &user).await?;
        AuthRepository::create(self.repo.as_ref(), &auth).await?;

        self.activity
            .audit(&user.user_id, actions::REGISTER, None, Some(client))
            .await;

        tracing::info!(
            user_id = %user.user_id,
            public_id = %user.public_id,
            "User registered"
        );

        Ok(SignUpOutput {
            public_id: user.public_id.to_string(),
        })
    }
}
