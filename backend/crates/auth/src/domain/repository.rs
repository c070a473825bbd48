//! Repository Traits
//!
//! Persistence interfaces; `infra::postgres` implements them.

use kernel::id::UserId;
use uuid::Uuid;

use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, passkey::PasskeyCredential, user::User,
};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn update(&self, user: &User) -> AuthResult<()>;
}

#[trait_variant::make(AuthRepository: Send)]
pub trait LocalAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()>;

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>>;

    async fn update(&self, auth: &Auth) -> AuthResult<()>;
}

#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Unexpired session whose fingerprint matches; a mismatch is an error
    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    /// Persist `expires_at_ms` and `last_activity_at`
    async fn update(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

#[trait_variant::make(PasskeyRepository: Send)]
pub trait LocalPasskeyRepository {
    async fn create(&self, credential: &PasskeyCredential) -> AuthResult<()>;

    /// Newest first
    async fn list_for_user(&self, user_id: &UserId) -> AuthResult<Vec<PasskeyCredential>>;

    async fn find_by_credential_id(
        &self,
        credential_id: &[u8],
    ) -> AuthResult<Option<PasskeyCredential>>;

    /// Persist the passkey state and `last_used_at`
    async fn update(&self, credential: &PasskeyCredential) -> AuthResult<()>;

    /// Returns whether a row owned by `user_id` was removed
    async fn delete(&self, user_id: &UserId, credential_id: &[u8]) -> AuthResult<bool>;
}

/// Everything the auth handlers need from storage
pub trait AuthStore:
    UserRepository
    + AuthRepository
    + AuthSessionRepository
    + PasskeyRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + PasskeyRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
