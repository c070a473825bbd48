//! Audit action names
//!
//! Stored verbatim in `audit_logs.action` and classified by
//! [`ActivityKind::classify`](crate::ActivityKind::classify).

pub const REGISTER: &str = "register";
pub const LOGIN: &str = "login";
pub const LOGIN_FAILED: &str = "login_failed";
pub const LOGIN_PASSKEY: &str = "login_passkey";
pub const LOGOUT: &str = "logout";

pub const TWO_FA_ENABLED: &str = "2fa_enabled";
pub const TWO_FA_DISABLED: &str = "2fa_disabled";
pub const PASSKEY_ADDED: &str = "passkey_added";
pub const PASSKEY_REMOVED: &str = "passkey_removed";

pub const SECRET_CREATED: &str = "secret_created";
pub const SECRET_UPDATED: &str = "secret_updated";
pub const SECRET_DELETED: &str = "secret_deleted";
pub const QUESTION_SET_CREATED: &str = "question_set_created";
pub const QUESTION_SET_DELETED: &str = "question_set_deleted";

pub const RECIPIENT_CREATED: &str = "recipient_created";
pub const RECIPIENT_UPDATED: &str = "recipient_updated";
pub const RECIPIENT_DELETED: &str = "recipient_deleted";
pub const ASSIGNMENT_CREATED: &str = "assignment_created";
pub const ASSIGNMENT_DELETED: &str = "assignment_deleted";

pub const CHECK_IN: &str = "check_in";
pub const SETTINGS_UPDATED: &str = "settings_updated";

pub const SWITCH_TRIGGERED: &str = "switch_triggered";
pub const SECRET_RELEASED: &str = "secret_released";
pub const SECRET_ACCESSED: &str = "secret_accessed";
