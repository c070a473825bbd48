pub mod auth;
pub mod auth_session;
pub mod passkey;
pub mod user;
