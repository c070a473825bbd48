//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::{AuditLogId, PingId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{AuditLog, PingHistory, PingMethod};
use crate::domain::repository::{AuditLogRepository, PingHistoryRepository};
use crate::error::{ActivityError, ActivityResult};

#[derive(Clone)]
pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Audit Log
// ============================================================================

impl AuditLogRepository for PgActivityRepository {
    async fn record(&self, entry: &AuditLog) -> ActivityResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id,
                user_id,
                action,
                details,
                ip_address,
                user_agent,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.user_id.as_uuid())
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId, limit: i64) -> ActivityResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT
                id,
                user_id,
                action,
                details,
                ip_address,
                user_agent,
                created_at
            FROM audit_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AuditLogRow::into_entry).collect())
    }
}

// ============================================================================
// Ping History
// ============================================================================

impl PingHistoryRepository for PgActivityRepository {
    async fn record(&self, ping: &PingHistory) -> ActivityResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ping_history (
                id,
                user_id,
                method,
                ip_address,
                user_agent,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(ping.id.as_uuid())
        .bind(ping.user_id.as_uuid())
        .bind(ping.method.code())
        .bind(&ping.ip_address)
        .bind(&ping.user_agent)
        .bind(ping.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> ActivityResult<Vec<PingHistory>> {
        let rows = sqlx::query_as::<_, PingRow>(
            r#"
            SELECT
                id,
                user_id,
                method,
                ip_address,
                user_agent,
                created_at
            FROM ping_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PingRow::into_ping).collect()
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    user_id: Uuid,
    action: String,
    details: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl AuditLogRow {
    fn into_entry(self) -> AuditLog {
        AuditLog {
            id: AuditLogId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            action: self.action,
            details: self.details,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PingRow {
    id: Uuid,
    user_id: Uuid,
    method: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl PingRow {
    fn into_ping(self) -> ActivityResult<PingHistory> {
        let method = PingMethod::from_code(&self.method)
            .ok_or_else(|| ActivityError::Internal(format!("Invalid ping method: {}", self.method)))?;

        Ok(PingHistory {
            id: PingId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            method,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        })
    }
}
