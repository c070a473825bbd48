//! Activity classification
//!
//! Groups free-form audit action names into a handful of categories for
//! display. Matching is a case-insensitive substring search and the first
//! matching rule wins.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CheckIn,
    Authentication,
    Security,
    Secret,
    Recipient,
    Release,
    Other,
}

const RULES: &[(&[&str], ActivityKind)] = &[
    (&["check_in", "check-in", "checkin"], ActivityKind::CheckIn),
    (&["login", "logout", "register"], ActivityKind::Authentication),
    (&["2fa", "totp", "passkey", "password"], ActivityKind::Security),
    (&["secret", "question"], ActivityKind::Secret),
    (&["recipient", "assignment"], ActivityKind::Recipient),
    (&["release", "access"], ActivityKind::Release),
];

impl ActivityKind {
    pub fn classify(action: &str) -> Self {
        let action = action.to_lowercase();
        RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| action.contains(n)))
            .map(|(_, kind)| *kind)
            .unwrap_or(ActivityKind::Other)
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CheckIn => "check_in",
            Self::Authentication => "authentication",
            Self::Security => "security",
            Self::Secret => "secret",
            Self::Recipient => "recipient",
            Self::Release => "release",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actions;

    #[test]
    fn test_classify_known_actions() {
        assert_eq!(ActivityKind::classify(actions::CHECK_IN), ActivityKind::CheckIn);
        assert_eq!(ActivityKind::classify(actions::LOGIN_FAILED), ActivityKind::Authentication);
        assert_eq!(ActivityKind::classify(actions::REGISTER), ActivityKind::Authentication);
        assert_eq!(ActivityKind::classify(actions::TWO_FA_ENABLED), ActivityKind::Security);
        assert_eq!(ActivityKind::classify(actions::PASSKEY_REMOVED), ActivityKind::Security);
        assert_eq!(ActivityKind::classify(actions::QUESTION_SET_CREATED), ActivityKind::Secret);
        assert_eq!(ActivityKind::classify(actions::ASSIGNMENT_CREATED), ActivityKind::Recipient);
        assert_eq!(ActivityKind::classify(actions::SETTINGS_UPDATED), ActivityKind::Other);
    }

    #[test]
    fn test_first_rule_wins() {
        // "login" beats "passkey"
        assert_eq!(ActivityKind::classify(actions::LOGIN_PASSKEY), ActivityKind::Authentication);
        // "secret" beats "release" and "access"
        assert_eq!(ActivityKind::classify(actions::SECRET_RELEASED), ActivityKind::Secret);
        assert_eq!(ActivityKind::classify(actions::SECRET_ACCESSED), ActivityKind::Secret);
        assert_eq!(ActivityKind::classify("password_reset_login"), ActivityKind::Authentication);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(ActivityKind::classify("Check-In via API"), ActivityKind::CheckIn);
        assert_eq!(ActivityKind::classify("TOTP_RESET"), ActivityKind::Security);
        assert_eq!(ActivityKind::classify("Release_Scheduled"), ActivityKind::Release);
        assert_eq!(ActivityKind::classify(""), ActivityKind::Other);
    }

    #[test]
    fn test_code() {
        assert_eq!(ActivityKind::CheckIn.code(), "check_in");
        assert_eq!(ActivityKind::Other.to_string(), "other");
        assert_eq!(
            serde_json::to_string(&ActivityKind::Authentication).unwrap(),
            "\"authentication\""
        );
    }
}
