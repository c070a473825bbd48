pub mod access;
pub mod assignments;
pub mod check_in;
pub mod config;
pub mod dashboard;
pub mod question_sets;
pub mod recipients;
pub mod release;
pub mod secrets;
pub mod settings;

pub use access::{AccessUseCase, AccessView, UnlockedSecret};
pub use assignments::{AssignmentSummary, AssignmentsUseCase, NewAssignment};
pub use check_in::CheckInUseCase;
pub use config::VaultConfig;
pub use dashboard::{DashboardOverview, DashboardUseCase};
pub use question_sets::{QuestionSetInput, QuestionSetsUseCase};
pub use recipients::{RecipientInput, RecipientsUseCase};
pub use release::{LogNotifier, Notifier, ReleaseNotice, ReleaseScheduler};
pub use secrets::{SecretDetails, SecretInput, SecretUpdate, SecretsUseCase};
pub use settings::SettingsUseCase;
