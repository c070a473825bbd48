//! Sign In Use Case
//!
//! Verifies email + password (+ TOTP when enabled) and opens a session.

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use platform::client::ClientFingerprint;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthRepository, AuthSessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    pub totp_code: Option<String>,
}

pub struct SignInOutput {
    /// Empty when `requires_2fa`
    pub session_token: String,
    pub requires_2fa: bool,
    pub public_id: String,
    pub expires_at_ms: i64,
}

pub struct SignInUseCase<R, L> {
    repo: Arc<R>,
    activity: ActivityRecorder<L>,
    config: Arc<AuthConfig>,
}

impl<R, L> SignInUseCase<R, L>
where
    R: UserRepository + AuthRepository + AuthSessionRepository + Send + Sync,
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
        input: SignInInput,
        client: &ClientFingerprint,
    ) -> AuthResult<SignInOutput> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let mut auth = self
            .repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;

        if auth.is_locked() {
            return Err(AuthError::AccountLocked);
        }

        let raw_password = RawPassword::for_login(input.password);
        if !auth.password_hash.verify(&raw_password, self.config.pepper()) {
            auth.record_failure();
            AuthRepository::update(self.repo.as_ref(), &auth).await?;
            self.activity
                .audit(
                    &user.user_id,
                    actions::LOGIN_FAILED,
                    Some("password".to_string()),
                    Some(client),
                )
                .await;
            return Err(AuthError::InvalidCredentials);
        }

        if auth.requires_2fa() {
            let Some(code) = input.totp_code.as_deref().filter(|c| !c.trim().is_empty()) else {
                return Ok(SignInOutput {
                    session_token: String::new(),
                    requires_2fa: true,
                    public_id: user.public_id.to_string(),
                    expires_at_ms: 0,
                });
            };

            let secret = auth.totp_secret.as_ref().ok_or(AuthError::TwoFactorNotSetup)?;
            if !secret.verify(code, user.email.as_str())? {
                auth.record_failure();
                AuthRepository::update(self.repo.as_ref(), &auth).await?;
                self.activity
                    .audit(
                        &user.user_id,
                        actions::LOGIN_FAILED,
                        Some("totp".to_string()),
                        Some(client),
                    )
                    .await;
                return Err(AuthError::InvalidTwoFactorCode);
            }
        }

        auth.reset_failures();
        AuthRepository::update(self.repo.as_ref(), &auth).await?;

        let (session, session_token) = start_session(
            self.repo.as_ref(),
            &self.config,
            user,
            input.remember_me,
            client,
        )
        .await?;

        self.activity
            .audit(&session.user_id, actions::LOGIN, None, Some(client))
            .await;

        tracing::info!(
            user_id = %session.user_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token,
            requires_2fa: false,
            public_id: session.public_id.to_string(),
            expires_at_ms: session.expires_at_ms,
        })
    }
}

/// Record the login on the user and persist a new session
pub(crate) async fn start_session<R>(
    repo: &R,
    config: &AuthConfig,
    mut user: User,
    remember_me: bool,
    client: &ClientFingerprint,
) -> AuthResult<(AuthSession, String)>
where
    R: UserRepository + AuthSessionRepository + Sync,
{
    user.record_login();
    UserRepository::update(repo, &user).await?;

    let ttl = chrono::Duration::from_std(config.session_ttl(remember_me))
        .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;

    let session = AuthSession::new(user.user_id, user.public_id, remember_me, client, ttl);
    AuthSessionRepository::create(repo, &session).await?;

    let token = session_token::issue(&config.session_secret, session.session_id)?;
    Ok((session, token))
}
