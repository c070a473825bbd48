//! Vault Backend Module
//!
//! Everything a user hands over to the switch and how it gets out again:
//! - Secrets sealed under the server master key
//! - Recipients and per-recipient assignments with one-time access tokens
//! - Secret questions: Shamir shares behind answer-derived keys, inside a
//!   timelock envelope that opens only after the release deadline
//! - Check-ins, switch settings and the dashboard
//! - The release scheduler that fires overdue switches
//!
//! Same layering as `auth`: `domain/`, `application/`, `infra/`,
//! `presentation/`.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use application::config::VaultConfig;
pub use application::release::{LogNotifier, Notifier, ReleaseNotice, ReleaseScheduler};
pub use domain::repository::VaultStore;
pub use error::{VaultError, VaultResult};
pub use infra::postgres::PgVaultRepository;
pub use presentation::router::{vault_router, vault_router_generic};
