//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, QuestionSetId, RecipientId, SecretId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::settings::{DEFAULT_GRACE_DAYS, DEFAULT_INTERVAL_DAYS};
use crate::domain::entity::{
    assignment::SecretAssignment,
    question_set::{SecretQuestion, SecretQuestionSet},
    recipient::Recipient,
    secret::Secret,
    settings::SwitchSettings,
};
use crate::domain::repository::{
    AssignmentRepository, QuestionSetRepository, RecipientRepository, SecretRepository,
    SettingsRepository,
};
use crate::error::{VaultError, VaultResult};

#[derive(Clone)]
pub struct PgVaultRepository {
    pool: PgPool,
}

impl PgVaultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Secrets
// ============================================================================

impl SecretRepository for PgVaultRepository {
    async fn create(&self, secret: &Secret) -> VaultResult<()> {
        sqlx::query(
            r#"
            INSERT INTO secrets (id, user_id, name, sealed_content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(secret.id.as_uuid())
        .bind(secret.user_id.as_uuid())
        .bind(&secret.name)
        .bind(&secret.sealed_content)
        .bind(secret.created_at)
        .bind(secret.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SecretId) -> VaultResult<Option<Secret>> {
        let row = sqlx::query_as::<_, SecretRow>(
            r#"
            SELECT id, user_id, name, sealed_content, created_at, updated_at
            FROM secrets
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SecretRow::into_secret))
    }

    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<Secret>> {
        let rows = sqlx::query_as::<_, SecretRow>(
            r#"
            SELECT id, user_id, name, sealed_content, created_at, updated_at
            FROM secrets
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SecretRow::into_secret).collect())
    }

    async fn update(&self, secret: &Secret) -> VaultResult<()> {
        sqlx::query(
            r#"
            UPDATE secrets
            SET name = $2, sealed_content = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(secret.id.as_uuid())
        .bind(&secret.name)
        .bind(&secret.sealed_content)
        .bind(secret.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &SecretId) -> VaultResult<()> {
        sqlx::query("DELETE FROM secrets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_for_user(&self, user_id: &UserId) -> VaultResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM secrets WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Recipients
// ============================================================================

impl RecipientRepository for PgVaultRepository {
    async fn create(&self, recipient: &Recipient) -> VaultResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recipients (id, user_id, name, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(recipient.id.as_uuid())
        .bind(recipient.user_id.as_uuid())
        .bind(&recipient.name)
        .bind(&recipient.email)
        .bind(&recipient.phone)
        .bind(recipient.created_at)
        .bind(recipient.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &RecipientId) -> VaultResult<Option<Recipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, user_id, name, email, phone, created_at, updated_at
            FROM recipients
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RecipientRow::into_recipient))
    }

    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<Recipient>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, user_id, name, email, phone, created_at, updated_at
            FROM recipients
            WHERE user_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RecipientRow::into_recipient).collect())
    }

    async fn update(&self, recipient: &Recipient) -> VaultResult<()> {
        sqlx::query(
            r#"
            UPDATE recipients
            SET name = $2, email = $3, phone = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(recipient.id.as_uuid())
        .bind(&recipient.name)
        .bind(&recipient.email)
        .bind(&recipient.phone)
        .bind(recipient.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RecipientId) -> VaultResult<()> {
        sqlx::query("DELETE FROM recipients WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_for_user(&self, user_id: &UserId) -> VaultResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipients WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Assignments
// ============================================================================

const ASSIGNMENT_COLUMNS: &str =
    "id, user_id, secret_id, recipient_id, access_token_hash, released_at, \
     failed_unlock_count, unlock_locked_until, created_at";

impl AssignmentRepository for PgVaultRepository {
    async fn create(&self, assignment: &SecretAssignment) -> VaultResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO secret_assignments (
                id,
                user_id,
                secret_id,
                recipient_id,
                access_token_hash,
                released_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(assignment.id.as_uuid())
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.secret_id.as_uuid())
        .bind(assignment.recipient_id.as_uuid())
        .bind(&assignment.access_token_hash)
        .bind(assignment.released_at)
        .bind(assignment.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // UNIQUE (secret_id, recipient_id) lost a race
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(VaultError::AlreadyAssigned)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &AssignmentId) -> VaultResult<Option<SecretAssignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM secret_assignments WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AssignmentRow::into_assignment))
    }

    async fn find_by_access_token_hash(
        &self,
        token_hash: &[u8],
    ) -> VaultResult<Option<SecretAssignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM secret_assignments WHERE access_token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AssignmentRow::into_assignment))
    }

    async fn exists(&self, secret_id: &SecretId, recipient_id: &RecipientId) -> VaultResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM secret_assignments WHERE secret_id = $1 AND recipient_id = $2
            )
            "#,
        )
        .bind(secret_id.as_uuid())
        .bind(recipient_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_for_secret(&self, secret_id: &SecretId) -> VaultResult<Vec<SecretAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM secret_assignments \
             WHERE secret_id = $1 ORDER BY created_at ASC"
        ))
        .bind(secret_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AssignmentRow::into_assignment).collect())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: &RecipientId,
    ) -> VaultResult<Vec<SecretAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM secret_assignments \
             WHERE recipient_id = $1 ORDER BY created_at ASC"
        ))
        .bind(recipient_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AssignmentRow::into_assignment).collect())
    }

    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<SecretAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM secret_assignments \
             WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AssignmentRow::into_assignment).collect())
    }

    async fn count_for_user(&self, user_id: &UserId) -> VaultResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM secret_assignments WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn delete(&self, id: &AssignmentId) -> VaultResult<()> {
        sqlx::query("DELETE FROM secret_assignments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_released_for_user(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> VaultResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE secret_assignments
            SET released_at = $2
            WHERE user_id = $1 AND released_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_unlock_state(&self, assignment: &SecretAssignment) -> VaultResult<()> {
        sqlx::query(
            r#"
            UPDATE secret_assignments
            SET failed_unlock_count = $2,
                unlock_locked_until = $3
            WHERE id = $1
            "#,
        )
        .bind(assignment.id.as_uuid())
        .bind(assignment.failed_unlock_count)
        .bind(assignment.unlock_locked_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ============================================================================
// Question Sets
// ============================================================================

const QUESTION_SET_COLUMNS: &str = "id, user_id, assignment_id, threshold, recipient_ciphertext, \
     sealed_shares, timelock_round, timelocked_shares, created_at, updated_at";

impl PgVaultRepository {
    async fn load_questions(&self, row: QuestionSetRow) -> VaultResult<SecretQuestionSet> {
        let questions = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT position, question
            FROM secret_questions
            WHERE question_set_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        row.into_set(questions)
    }
}

impl QuestionSetRepository for PgVaultRepository {
    async fn upsert(&self, set: &SecretQuestionSet) -> VaultResult<()> {
        let round = i64::try_from(set.timelock_round)
            .map_err(|_| VaultError::Internal("Timelock round out of range".to_string()))?;

        let mut tx = self.pool.begin().await?;

        // Questions go with their set via ON DELETE CASCADE
        sqlx::query("DELETE FROM secret_question_sets WHERE assignment_id = $1")
            .bind(set.assignment_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO secret_question_sets (
                id,
                user_id,
                assignment_id,
                threshold,
                recipient_ciphertext,
                sealed_shares,
                timelock_round,
                timelocked_shares,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(set.id.as_uuid())
        .bind(set.user_id.as_uuid())
        .bind(set.assignment_id.as_uuid())
        .bind(i16::from(set.threshold))
        .bind(&set.recipient_ciphertext)
        .bind(&set.sealed_shares)
        .bind(round)
        .bind(&set.timelocked_shares)
        .bind(set.created_at)
        .bind(set.updated_at)
        .execute(&mut *tx)
        .await?;

        for question in &set.questions {
            sqlx::query(
                r#"
                INSERT INTO secret_questions (question_set_id, position, question)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(set.id.as_uuid())
            .bind(i16::from(question.position))
            .bind(&question.question)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> VaultResult<Option<SecretQuestionSet>> {
        let row = sqlx::query_as::<_, QuestionSetRow>(&format!(
            "SELECT {QUESTION_SET_COLUMNS} FROM secret_question_sets WHERE assignment_id = $1"
        ))
        .bind(assignment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_questions(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: &UserId) -> VaultResult<Vec<SecretQuestionSet>> {
        let rows = sqlx::query_as::<_, QuestionSetRow>(&format!(
            "SELECT {QUESTION_SET_COLUMNS} FROM secret_question_sets \
             WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut sets = Vec::with_capacity(rows.len());
        for row in rows {
            sets.push(self.load_questions(row).await?);
        }
        Ok(sets)
    }

    async fn update_timelock(
        &self,
        id: &QuestionSetId,
        round: u64,
        timelocked_shares: &[u8],
    ) -> VaultResult<()> {
        let round = i64::try_from(round)
            .map_err(|_| VaultError::Internal("Timelock round out of range".to_string()))?;

        sqlx::query(
            r#"
            UPDATE secret_question_sets
            SET timelock_round = $2, timelocked_shares = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(round)
        .bind(timelocked_shares)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_assignment(&self, assignment_id: &AssignmentId) -> VaultResult<bool> {
        let result = sqlx::query("DELETE FROM secret_question_sets WHERE assignment_id = $1")
            .bind(assignment_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Switch Settings
// ============================================================================

impl SettingsRepository for PgVaultRepository {
    async fn find(&self, user_id: &UserId) -> VaultResult<Option<SwitchSettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT
                user_id,
                check_in_interval_days,
                grace_period_days,
                last_check_in_at,
                triggered_at,
                created_at,
                updated_at
            FROM switch_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SettingsRow::into_settings))
    }

    async fn save(&self, settings: &SwitchSettings) -> VaultResult<()> {
        sqlx::query(
            r#"
            INSERT INTO switch_settings (
                user_id,
                check_in_interval_days,
                grace_period_days,
                last_check_in_at,
                triggered_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                check_in_interval_days = EXCLUDED.check_in_interval_days,
                grace_period_days = EXCLUDED.grace_period_days,
                last_check_in_at = EXCLUDED.last_check_in_at,
                triggered_at = EXCLUDED.triggered_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(settings.user_id.as_uuid())
        .bind(settings.check_in_interval_days)
        .bind(settings.grace_period_days)
        .bind(settings.last_check_in_at)
        .bind(settings.triggered_at)
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> VaultResult<Vec<SwitchSettings>> {
        let rows = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT *
            FROM (
                SELECT
                    u.user_id,
                    COALESCE(s.check_in_interval_days, $2) AS check_in_interval_days,
                    COALESCE(s.grace_period_days, $3) AS grace_period_days,
                    COALESCE(s.last_check_in_at, u.created_at) AS last_check_in_at,
                    s.triggered_at,
                    COALESCE(s.created_at, u.created_at) AS created_at,
                    COALESCE(s.updated_at, u.created_at) AS updated_at
                FROM users u
                LEFT JOIN switch_settings s ON s.user_id = u.user_id
                WHERE s.user_id IS NOT NULL
                   OR EXISTS (SELECT 1 FROM secret_assignments a WHERE a.user_id = u.user_id)
            ) AS switches
            WHERE triggered_at IS NULL
              AND last_check_in_at
                  + make_interval(days => check_in_interval_days + grace_period_days) <= $1
            ORDER BY last_check_in_at ASC
            "#,
        )
        .bind(now)
        .bind(DEFAULT_INTERVAL_DAYS)
        .bind(DEFAULT_GRACE_DAYS)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SettingsRow::into_settings).collect())
    }

    async fn account_created_at(&self, user_id: &UserId) -> VaultResult<Option<DateTime<Utc>>> {
        let created_at = sqlx::query_scalar("SELECT created_at FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(created_at)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct SecretRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    sealed_content: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SecretRow {
    fn into_secret(self) -> Secret {
        Secret {
            id: SecretId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            sealed_content: self.sealed_content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecipientRow {
    fn into_recipient(self) -> Recipient {
        Recipient {
            id: RecipientId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: Uuid,
    user_id: Uuid,
    secret_id: Uuid,
    recipient_id: Uuid,
    access_token_hash: Vec<u8>,
    released_at: Option<DateTime<Utc>>,
    failed_unlock_count: i16,
    unlock_locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl AssignmentRow {
    fn into_assignment(self) -> SecretAssignment {
        SecretAssignment {
            id: AssignmentId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            secret_id: SecretId::from_uuid(self.secret_id),
            recipient_id: RecipientId::from_uuid(self.recipient_id),
            access_token_hash: self.access_token_hash,
            released_at: self.released_at,
            failed_unlock_count: self.failed_unlock_count,
            unlock_locked_until: self.unlock_locked_until,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QuestionSetRow {
    id: Uuid,
    user_id: Uuid,
    assignment_id: Uuid,
    threshold: i16,
    recipient_ciphertext: Vec<u8>,
    sealed_shares: Vec<u8>,
    timelock_round: i64,
    timelocked_shares: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    position: i16,
    question: String,
}

impl QuestionSetRow {
    fn into_set(self, questions: Vec<QuestionRow>) -> VaultResult<SecretQuestionSet> {
        let out_of_range = |field: &str| VaultError::Internal(format!("Invalid {field} in database"));

        let questions = questions
            .into_iter()
            .map(|q| {
                Ok(SecretQuestion {
                    position: u8::try_from(q.position).map_err(|_| out_of_range("position"))?,
                    question: q.question,
                })
            })
            .collect::<VaultResult<Vec<_>>>()?;

        Ok(SecretQuestionSet {
            id: QuestionSetId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            assignment_id: AssignmentId::from_uuid(self.assignment_id),
            threshold: u8::try_from(self.threshold).map_err(|_| out_of_range("threshold"))?,
            questions,
            recipient_ciphertext: self.recipient_ciphertext,
            sealed_shares: self.sealed_shares,
            timelock_round: u64::try_from(self.timelock_round)
                .map_err(|_| out_of_range("timelock round"))?,
            timelocked_shares: self.timelocked_shares,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    user_id: Uuid,
    check_in_interval_days: i32,
    grace_period_days: i32,
    last_check_in_at: DateTime<Utc>,
    triggered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn into_settings(self) -> SwitchSettings {
        SwitchSettings {
            user_id: UserId::from_uuid(self.user_id),
            check_in_interval_days: self.check_in_interval_days,
            grace_period_days: self.grace_period_days,
            last_check_in_at: self.last_check_in_at,
            triggered_at: self.triggered_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
