//! TOTP Setup Use Case
//!
//! Enrollment is two-step: `setup` stores a fresh secret, `verify` enables
//! it once the user proves their authenticator produces valid codes.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use kernel::id::UserId;
use platform::client::ClientFingerprint;

use crate::domain::entity::{auth::Auth, user::User};
use crate::domain::repository::{AuthRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct TotpSetupOutput {
    /// PNG, base64 encoded
    pub qr_code_base64: String,
    pub secret: String,
    pub otpauth_url: String,
}

pub struct TotpSetupUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
}

impl<R, L> TotpSetupUseCase<R, L>
where
    R: UserRepository + AuthRepository + Send + Sync,
    L: ActivityStore,
{
    pub fn new(repo: Arc<R>, activity: ActivityRecorder<L>) -> Self {
        Self { repo, activity }
    }

    async fn load(&self, user_id: &UserId) -> AuthResult<(User, Auth)> {
        let user = UserRepository::find_by_id(self.repo.as_ref(), user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let auth = self
            .repo
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;
        Ok((user, auth))
    }

    pub async fn setup(&self, user_id: &UserId) -> AuthResult<TotpSetupOutput> {
        let (user, mut auth) = self.load(user_id).await?;

        let secret = auth.begin_totp_setup();
        AuthRepository::update(self.repo.as_ref(), &auth).await?;

        let account = user.email.as_str();
        let output = TotpSetupOutput {
            qr_code_base64: secret.qr_code(account)?,
            secret: secret.as_base32().to_string(),
            otpauth_url: secret.otpauth_url(account)?,
        };

        tracing::info!(user_id = %user_id, "TOTP setup started");
        Ok(output)
    }

    pub async fn verify(
        &self,
        user_id: &UserId,
        code: &str,
        client: &ClientFingerprint,
    ) -> AuthResult<()> {
        let (user, mut auth) = self.load(user_id).await?;

        let secret = auth.totp_secret.as_ref().ok_or(AuthError::TwoFactorNotSetup)?;
        if !secret.verify(code, user.email.as_str())? {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        auth.enable_totp();
        AuthRepository::update(self.repo.as_ref(), &auth).await?;

        self.activity
            .audit(user_id, actions::TWO_FA_ENABLED, None, Some(client))
            .await;
        tracing::info!(user_id = %user_id, "TOTP enabled");
        Ok(())
    }

    pub async fn disable(
        &self,
        user_id: &UserId,
        code: &str,
        client: &ClientFingerprint,
    ) -> AuthResult<()> {
        let (user, mut auth) = self.load(user_id).await?;

        if !auth.requires_2fa() {
            return Err(AuthError::TwoFactorNotSetup);
        }

        let secret = auth.totp_secret.as_ref().ok_or(AuthError::TwoFactorNotSetup)?;
        if !secret.verify(code, user.email.as_str())? {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        auth.disable_totp();
        AuthRepository::update(self.repo.as_ref(), &auth).await?;

        self.activity
            .audit(user_id, actions::TWO_FA_DISABLED, None, Some(client))
            .await;
        tracing::info!(user_id = %user_id, "TOTP disabled");
        Ok(())
    }
}
