//! Sign Out Use Case

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, actions};
use platform::client::ClientFingerprint;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::repository::AuthSessionRepository;
use crate::error::AuthResult;

pub struct SignOutUseCase<S, L> {
    session_repo: Arc<S>,
    activity: ActivityRecorder<L>,
    config: Arc<AuthConfig>,
}

impl<S, L> SignOutUseCase<S, L>
where
    S: AuthSessionRepository + Send + Sync,
    L: ActivityStore,
{
    pub fn new(session_repo: Arc<S>, activity: ActivityRecorder<L>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            activity,
            config,
        }
    }

    /// Delete the session behind `session_token`, if it is still valid
    pub async fn execute(&self, session_token: &str, client: &ClientFingerprint) -> AuthResult<()> {
        let session_id = session_token::parse(&self.config.session_secret, session_token)?;

        if let Some(session) = self.session_repo.find_by_id(session_id, &client.hash).await? {
            self.activity
                .audit(&session.user_id, actions::LOGOUT, None, Some(client))
                .await;
        }
        self.session_repo.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "User signed out");
        Ok(())
    }
}
