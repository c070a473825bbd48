//! Passkey Ceremonies
//!
//! Wraps `webauthn-rs` and keeps in-progress registration and
//! authentication states in memory:
//! - states expire after `challenge_ttl` and are pruned on every access
//! - each state is removed when finished, so a challenge is single use
//! - registration is bound to the user and the session that started it

use std::collections::HashMap;
use std::time::{Duration, Instant};

use kernel::error::kind::ErrorKind;
use kernel::id::UserId;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;
use uuid::Uuid;
use webauthn_rs::prelude::*;

use crate::application::config::PasskeyConfig;
use crate::domain::entity::passkey::PasskeyCredential;

#[derive(Debug, Error)]
pub enum PasskeyError {
    #[error("Passkey ceremony not found or expired")]
    CeremonyNotFound,

    #[error("Passkey ceremony belongs to another user")]
    UserMismatch,

    #[error("Passkey ceremony belongs to another session")]
    SessionMismatch,

    #[error("No passkeys registered for this account")]
    NoCredentials,

    #[error("Unknown passkey")]
    UnknownCredential,

    #[error("Passkey verification failed: {0}")]
    Verification(#[source] WebauthnError),

    #[error("Invalid passkey configuration: {0}")]
    Config(String),

    #[error("Stored passkey is unreadable: {0}")]
    Storage(String),
}

impl PasskeyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PasskeyError::CeremonyNotFound => ErrorKind::BadRequest,
            PasskeyError::UserMismatch
            | PasskeyError::SessionMismatch
            | PasskeyError::NoCredentials
            | PasskeyError::UnknownCredential
            | PasskeyError::Verification(_) => ErrorKind::Unauthorized,
            PasskeyError::Config(_) | PasskeyError::Storage(_) => ErrorKind::InternalServerError,
        }
    }
}

struct RegistrationState {
    user_id: UserId,
    session_id: Uuid,
    created_at: Instant,
    registration: PasskeyRegistration,
}

struct AuthenticationState {
    user_id: UserId,
    created_at: Instant,
    authentication: PasskeyAuthentication,
}

pub struct PasskeyService {
    webauthn: Webauthn,
    challenge_ttl: Duration,
    registrations: Mutex<HashMap<Uuid, RegistrationState>>,
    authentications: Mutex<HashMap<Uuid, AuthenticationState>>,
}

impl PasskeyService {
    pub fn new(config: &PasskeyConfig) -> Result<Self, PasskeyError> {
        let origin = Url::parse(&config.rp_origin)
            .map_err(|e| PasskeyError::Config(format!("{}: {e}", config.rp_origin)))?;

        let webauthn = WebauthnBuilder::new(&config.rp_id, &origin)
            .and_then(|builder| builder.rp_name(&config.rp_name).build())
            .map_err(|e| PasskeyError::Config(e.to_string()))?;

        Ok(Self {
            webauthn,
            challenge_ttl: config.challenge_ttl,
            registrations: Mutex::new(HashMap::new()),
            authentications: Mutex::new(HashMap::new()),
        })
    }

    pub async fn register_begin(
        &self,
        user_id: UserId,
        user_name: &str,
        session_id: Uuid,
        existing: &[PasskeyCredential],
    ) -> Result<(Uuid, CreationChallengeResponse), PasskeyError> {
        let exclude = (!existing.is_empty()).then(|| {
            existing
                .iter()
                .map(|c| c.passkey.cred_id().clone())
                .collect::<Vec<_>>()
        });

        let (challenge, registration) = self
            .webauthn
            .start_passkey_registration(*user_id.as_uuid(), user_name, user_name, exclude)
            .map_err(PasskeyError::Verification)?;

        let registration_id = Uuid::new_v4();
        let mut states = self.registrations.lock().await;
        states.retain(|_, s| s.created_at.elapsed() < self.challenge_ttl);
        states.insert(
            registration_id,
            RegistrationState {
                user_id,
                session_id,
                created_at: Instant::now(),
                registration,
            },
        );

        Ok((registration_id, challenge))
    }

    pub async fn register_finish(
        &self,
        registration_id: Uuid,
        user_id: &UserId,
        session_id: Uuid,
        response: &RegisterPublicKeyCredential,
    ) -> Result<Passkey, PasskeyError> {
        let state = {
            let mut states = self.registrations.lock().await;
            states.retain(|_, s| s.created_at.elapsed() < self.challenge_ttl);
            states
                .remove(&registration_id)
                .ok_or(PasskeyError::CeremonyNotFound)?
        };

        if &state.user_id != user_id {
            return Err(PasskeyError::UserMismatch);
        }
        if state.session_id != session_id {
            return Err(PasskeyError::SessionMismatch);
        }

        self.webauthn
            .finish_passkey_registration(response, &state.registration)
            .map_err(PasskeyError::Verification)
    }

    pub async fn authenticate_begin(
        &self,
        user_id: UserId,
        passkeys: &[Passkey],
    ) -> Result<(Uuid, RequestChallengeResponse), PasskeyError> {
        if passkeys.is_empty() {
            return Err(PasskeyError::NoCredentials);
        }

        let (challenge, authentication) = self
            .webauthn
            .start_passkey_authentication(passkeys)
            .map_err(PasskeyError::Verification)?;

        let authentication_id = Uuid::new_v4();
        let mut states = self.authentications.lock().await;
        states.retain(|_, s| s.created_at.elapsed() < self.challenge_ttl);
        states.insert(
            authentication_id,
            AuthenticationState {
                user_id,
                created_at: Instant::now(),
                authentication,
            },
        );

        Ok((authentication_id, challenge))
    }

    /// Returns the user the ceremony was started for
    pub async fn authenticate_finish(
        &self,
        authentication_id: Uuid,
        response: &PublicKeyCredential,
    ) -> Result<(UserId, AuthenticationResult), PasskeyError> {
        let state = {
            let mut states = self.authentications.lock().await;
            states.retain(|_, s| s.created_at.elapsed() < self.challenge_ttl);
            states
                .remove(&authentication_id)
                .ok_or(PasskeyError::CeremonyNotFound)?
        };

        self.webauthn
            .finish_passkey_authentication(response, &state.authentication)
            .map(|result| (state.user_id, result))
            .map_err(PasskeyError::Verification)
    }
}

pub fn serialize_passkey(passkey: &Passkey) -> Result<Vec<u8>, PasskeyError> {
    serde_json::to_vec(passkey).map_err(|e| PasskeyError::Storage(e.to_string()))
}

pub fn deserialize_passkey(data: &[u8]) -> Result<Passkey, PasskeyError> {
    serde_json::from_slice(data).map_err(|e| PasskeyError::Storage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(ttl: Duration) -> PasskeyService {
        let config = PasskeyConfig {
            rp_id: "example.com".to_string(),
            rp_name: "Example".to_string(),
            rp_origin: "https://example.com".to_string(),
            challenge_ttl: ttl,
        };
        PasskeyService::new(&config).unwrap()
    }

    fn dummy_registration() -> RegisterPublicKeyCredential {
        serde_json::from_value(serde_json::json!({
            "id": "dummy",
            "rawId": "AA",
            "type": "public-key",
            "response": {
                "attestationObject": "AA",
                "clientDataJSON": "AA"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let config = PasskeyConfig {
            rp_origin: "not a url".to_string(),
            ..PasskeyConfig::default()
        };
        assert!(matches!(
            PasskeyService::new(&config),
            Err(PasskeyError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_registration_state_is_single_use() {
        let service = service(Duration::from_secs(60));
        let user_id = UserId::new();
        let session_id = Uuid::new_v4();
        let (reg_id, _) = service
            .register_begin(user_id, "alice@example.com", session_id, &[])
            .await
            .unwrap();

        // Verification fails on the dummy credential but still consumes the state
        let first = service
            .register_finish(reg_id, &user_id, session_id, &dummy_registration())
            .await;
        assert!(matches!(first, Err(PasskeyError::Verification(_))));

        let second = service
            .register_finish(reg_id, &user_id, session_id, &dummy_registration())
            .await;
        assert!(matches!(second, Err(PasskeyError::CeremonyNotFound)));
    }

    #[tokio::test]
    async fn test_registration_bound_to_user_and_session() {
        let service = service(Duration::from_secs(60));
        let user_id = UserId::new();
        let session_id = Uuid::new_v4();

        let (reg_id, _) = service
            .register_begin(user_id, "alice@example.com", session_id, &[])
            .await
            .unwrap();
        let err = service
            .register_finish(reg_id, &UserId::new(), session_id, &dummy_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, PasskeyError::UserMismatch));

        let (reg_id, _) = service
            .register_begin(user_id, "alice@example.com", session_id, &[])
            .await
            .unwrap();
        let err = service
            .register_finish(reg_id, &user_id, Uuid::new_v4(), &dummy_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, PasskeyError::SessionMismatch));
    }

    #[tokio::test]
    async fn test_expired_ceremony_is_pruned() {
        let service = service(Duration::ZERO);
        let user_id = UserId::new();
        let session_id = Uuid::new_v4();
        let (reg_id, _) = service
            .register_begin(user_id, "alice@example.com", session_id, &[])
            .await
            .unwrap();

        let err = service
            .register_finish(reg_id, &user_id, session_id, &dummy_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, PasskeyError::CeremonyNotFound));
    }

    #[tokio::test]
    async fn test_authentication_requires_credentials() {
        let service = service(Duration::from_secs(60));
        let err = service
            .authenticate_begin(UserId::new(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PasskeyError::NoCredentials));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
