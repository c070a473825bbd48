//! Activity Module
//!
//! Append-only records of what happened to an account:
//! - Audit log rows (logins, secret changes, releases, ...)
//! - Ping history (every check-in, with how it arrived)
//!
//! Both are side records. Writers go through [`ActivityRecorder`], which
//! never fails the surrounding request.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

pub use application::recorder::ActivityRecorder;
pub use domain::actions;
pub use domain::entity::{AuditLog, PingHistory, PingMethod};
pub use domain::kind::ActivityKind;
pub use domain::repository::{ActivityStore, AuditLogRepository, PingHistoryRepository};
pub use error::{ActivityError, ActivityResult};
pub use infra::postgres::PgActivityRepository;
