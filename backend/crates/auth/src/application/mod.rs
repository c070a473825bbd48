//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod passkey_setup;
pub mod passkey_sign_in;
pub mod passkeys;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod totp_setup;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::{AuthConfig, PasskeyConfig};
pub use passkey_setup::{PasskeyRegistrationInput, PasskeySetupUseCase};
pub use passkey_sign_in::PasskeySignInUseCase;
pub use passkeys::{PasskeyError, PasskeyService};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use totp_setup::{TotpSetupOutput, TotpSetupUseCase};
