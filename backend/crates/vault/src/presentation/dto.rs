//! API DTOs (Data Transfer Objects)

use activity::{ActivityKind, AuditLog, PingHistory, PingMethod};
use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, RecipientId, SecretId};
use serde::{Deserialize, Serialize};

use crate::application::{
    AccessView, AssignmentSummary, DashboardOverview, NewAssignment, SecretDetails, SecretUpdate,
};
use crate::domain::entity::{
    question_set::{QuestionAnswer, SecretQuestionSet},
    recipient::Recipient,
    secret::Secret,
    settings::{SwitchSettings, SwitchStatus},
};

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub settings: SettingsResponse,
    pub status: SwitchStatus,
    pub next_deadline: DateTime<Utc>,
    pub release_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub secret_count: i64,
    pub recipient_count: i64,
    pub assignment_count: i64,
    pub recent_activity: Vec<ActivityResponse>,
    pub recent_pings: Vec<PingResponse>,
}

impl From<DashboardOverview> for DashboardResponse {
    fn from(overview: DashboardOverview) -> Self {
        Self {
            settings: SettingsResponse::from(&overview.settings),
            status: overview.status,
            next_deadline: overview.next_deadline,
            release_at: overview.release_at,
            days_remaining: overview.days_remaining,
            secret_count: overview.secret_count,
            recipient_count: overview.recipient_count,
            assignment_count: overview.assignment_count,
            recent_activity: overview.recent_activity.iter().map(ActivityResponse::from).collect(),
            recent_pings: overview.recent_pings.iter().map(PingResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub action: String,
    pub kind: ActivityKind,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&AuditLog> for ActivityResponse {
    fn from(entry: &AuditLog) -> Self {
        Self {
            action: entry.action.clone(),
            kind: entry.kind(),
            details: entry.details.clone(),
            ip_address: entry.ip_address.clone(),
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub method: PingMethod,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&PingHistory> for PingResponse {
    fn from(ping: &PingHistory) -> Self {
        Self {
            method: ping.method,
            ip_address: ping.ip_address.clone(),
            user_agent: ping.user_agent.clone(),
            created_at: ping.created_at,
        }
    }
}

// ============================================================================
// Secrets
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SecretRequest {
    pub name: String,
    pub content: String,
}

/// Answer to a content update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretUpdateResponse {
    #[serde(flatten)]
    pub secret: SecretSummaryResponse,
    /// Question sets dropped with the old content; re-create them to keep gating
    pub cleared_question_sets: usize,
}

impl From<&SecretUpdate> for SecretUpdateResponse {
    fn from(update: &SecretUpdate) -> Self {
        Self {
            secret: SecretSummaryResponse::from(&update.secret),
            cleared_question_sets: update.cleared_question_sets,
        }
    }
}

/// Listing entry; never carries content
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSummaryResponse {
    pub id: SecretId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Secret> for SecretSummaryResponse {
    fn from(secret: &Secret) -> Self {
        Self {
            id: secret.id,
            name: secret.name.clone(),
            created_at: secret.created_at,
            updated_at: secret.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretResponse {
    pub id: SecretId,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SecretDetails> for SecretResponse {
    fn from(details: SecretDetails) -> Self {
        Self {
            id: details.secret.id,
            name: details.secret.name,
            content: details.content,
            created_at: details.secret.created_at,
            updated_at: details.secret.updated_at,
        }
    }
}

// ============================================================================
// Recipients
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RecipientRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResponse {
    pub id: RecipientId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Recipient> for RecipientResponse {
    fn from(recipient: &Recipient) -> Self {
        Self {
            id: recipient.id,
            name: recipient.name.clone(),
            email: recipient.email.clone(),
            phone: recipient.phone.clone(),
            created_at: recipient.created_at,
            updated_at: recipient.updated_at,
        }
    }
}

// ============================================================================
// Assignments
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub recipient_id: RecipientId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCreatedResponse {
    pub id: AssignmentId,
    pub secret_id: SecretId,
    pub recipient_id: RecipientId,
    pub recipient_name: String,
    /// Only ever returned here
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

impl From<NewAssignment> for AssignmentCreatedResponse {
    fn from(created: NewAssignment) -> Self {
        Self {
            id: created.assignment.id,
            secret_id: created.assignment.secret_id,
            recipient_id: created.assignment.recipient_id,
            recipient_name: created.recipient.name,
            access_token: created.access_token,
            created_at: created.assignment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: AssignmentId,
    pub recipient_id: RecipientId,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    pub has_questions: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AssignmentSummary> for AssignmentResponse {
    fn from(summary: AssignmentSummary) -> Self {
        let (recipient_name, recipient_email) = match summary.recipient {
            Some(r) => (Some(r.name), Some(r.email)),
            None => (None, None),
        };
        Self {
            id: summary.assignment.id,
            recipient_id: summary.assignment.recipient_id,
            recipient_name,
            recipient_email,
            released_at: summary.assignment.released_at,
            has_questions: summary.has_questions,
            created_at: summary.assignment.created_at,
        }
    }
}

// ============================================================================
// Question Sets
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionPairRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionSetRequest {
    pub threshold: u8,
    pub questions: Vec<QuestionPairRequest>,
}

impl QuestionSetRequest {
    pub fn into_pairs(self) -> Vec<QuestionAnswer> {
        self.questions
            .into_iter()
            .map(|q| QuestionAnswer {
                question: q.question,
                answer: q.answer,
            })
            .collect()
    }
}

/// Prompts only; answers are never stored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetResponse {
    pub assignment_id: AssignmentId,
    pub threshold: u8,
    pub questions: Vec<String>,
    pub timelock_round: u64,
    pub unlock_available_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl QuestionSetResponse {
    pub fn new(set: &SecretQuestionSet, unlock_available_at: DateTime<Utc>) -> Self {
        Self {
            assignment_id: set.assignment_id,
            threshold: set.threshold,
            questions: set.prompts(),
            timelock_round: set.timelock_round,
            unlock_available_at,
            created_at: set.created_at,
        }
    }
}

// ============================================================================
// Check-in & Settings
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub last_check_in_at: DateTime<Utc>,
    pub next_deadline: DateTime<Utc>,
}

impl From<&SwitchSettings> for CheckInResponse {
    fn from(settings: &SwitchSettings) -> Self {
        Self {
            last_check_in_at: settings.last_check_in_at,
            next_deadline: settings.deadline(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub check_in_interval_days: i32,
    pub grace_period_days: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub check_in_interval_days: i32,
    pub grace_period_days: i32,
    pub last_check_in_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
    pub next_deadline: DateTime<Utc>,
    pub release_at: DateTime<Utc>,
}

impl From<&SwitchSettings> for SettingsResponse {
    fn from(settings: &SwitchSettings) -> Self {
        Self {
            check_in_interval_days: settings.check_in_interval_days,
            grace_period_days: settings.grace_period_days,
            last_check_in_at: settings.last_check_in_at,
            triggered_at: settings.triggered_at,
            next_deadline: settings.deadline(),
            release_at: settings.release_at(),
        }
    }
}

// ============================================================================
// Recipient Access
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub secret_name: String,
    pub released: bool,
    pub questions: Vec<String>,
    pub threshold: Option<u8>,
    pub unlock_available_at: Option<DateTime<Utc>>,
}

impl From<AccessView> for AccessResponse {
    fn from(view: AccessView) -> Self {
        Self {
            secret_name: view.secret_name,
            released: view.released,
            questions: view.questions,
            threshold: view.threshold,
            unlock_available_at: view.unlock_available_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnlockRequest {
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub secret_name: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::UserId;

    #[test]
    fn test_settings_request_is_camel_case() {
        let req: SettingsRequest =
            serde_json::from_str(r#"{"checkInIntervalDays":14,"gracePeriodDays":2}"#).unwrap();
        assert_eq!(req.check_in_interval_days, 14);
        assert_eq!(req.grace_period_days, 2);
    }

    #[test]
    fn test_assign_request_parses_uuid() {
        let id = RecipientId::new();
        let req: AssignRequest =
            serde_json::from_str(&format!(r#"{{"recipientId":"{id}"}}"#)).unwrap();
        assert_eq!(req.recipient_id, id);
        assert!(serde_json::from_str::<AssignRequest>(r#"{"recipientId":"nope"}"#).is_err());
    }

    #[test]
    fn test_settings_response_shape() {
        let settings = SwitchSettings::new(UserId::new(), Utc::now());
        let json = serde_json::to_value(SettingsResponse::from(&settings)).unwrap();
        assert_eq!(json["checkInIntervalDays"], 30);
        assert_eq!(json["gracePeriodDays"], 7);
        assert!(json["triggeredAt"].is_null());
        assert!(json.get("nextDeadline").is_some());
    }

    #[test]
    fn test_summary_has_no_content() {
        let secret = Secret::new(UserId::new(), "Bank".to_string());
        let json = serde_json::to_value(SecretSummaryResponse::from(&secret)).unwrap();
        assert_eq!(json["name"], "Bank");
        assert!(json.get("content").is_none());
        assert!(json.get("sealedContent").is_none());
    }
}
