//! Activity Entities

use chrono::{DateTime, Utc};
use kernel::id::{AuditLogId, PingId, UserId};
use platform::client::ClientFingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::kind::ActivityKind;

// ============================================================================
// AuditLog
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub user_id: UserId,
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        user_id: UserId,
        action: impl Into<String>,
        details: Option<String>,
        client: Option<&ClientFingerprint>,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            user_id,
            action: action.into(),
            details,
            ip_address: client.and_then(|c| c.ip_string()),
            user_agent: client.and_then(|c| c.user_agent.clone()),
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> ActivityKind {
        ActivityKind::classify(&self.action)
    }
}

// ============================================================================
// PingHistory
// ============================================================================

/// How a check-in reached the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PingMethod {
    Web,
    Api,
}

impl PingMethod {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Api => "api",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "web" => Some(Self::Web),
            "api" => Some(Self::Api),
            _ => None,
        }
    }
}

impl fmt::Display for PingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct PingHistory {
    pub id: PingId,
    pub user_id: UserId,
    pub method: PingMethod,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PingHistory {
    pub fn new(user_id: UserId, method: PingMethod, client: Option<&ClientFingerprint>) -> Self {
        Self {
            id: PingId::new(),
            user_id,
            method,
            ip_address: client.and_then(|c| c.ip_string()),
            user_agent: client.and_then(|c| c.user_agent.clone()),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_audit_log_captures_client() {
        let client = ClientFingerprint::new(
            [0u8; 32],
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
            Some("curl/8.0".to_string()),
        );
        let entry = AuditLog::new(UserId::new(), "check_in", None, Some(&client));
        assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(entry.kind(), ActivityKind::CheckIn);

        let bare = AuditLog::new(UserId::new(), "logout", None, None);
        assert!(bare.ip_address.is_none());
    }

    #[test]
    fn test_ping_method_codes() {
        assert_eq!(PingMethod::from_code("api"), Some(PingMethod::Api));
        assert_eq!(PingMethod::from_code(PingMethod::Web.code()), Some(PingMethod::Web));
        assert_eq!(PingMethod::from_code("sms"), None);
    }
}
