//! HTTP Handlers

use std::net::SocketAddr;
use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, PingMethod};
use auth::CurrentUser;
use axum::Extension;
use axum::Json;
use axum::extract::{ConnectInfo, OriginalUri, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use kernel::id::{AssignmentId, RecipientId, SecretId};
use platform::client::{ClientFingerprint, extract_client_ip, extract_fingerprint};
use platform::timelock::Beacon;

use crate::application::{
    AccessUseCase, AssignmentsUseCase, CheckInUseCase, DashboardUseCase, QuestionSetInput,
    QuestionSetsUseCase, RecipientInput, RecipientsUseCase, SecretInput, SecretsUseCase,
    SettingsUseCase, VaultConfig,
};
use crate::domain::repository::VaultStore;
use crate::error::VaultResult;
use crate::presentation::dto::{
    AccessResponse, AssignRequest, AssignmentCreatedResponse, AssignmentResponse,
    CheckInResponse, DashboardResponse, PingResponse, QuestionSetRequest, QuestionSetResponse,
    RecipientRequest, RecipientResponse, SecretRequest, SecretResponse, SecretSummaryResponse,
    SecretUpdateResponse, SettingsRequest, SettingsResponse, UnlockRequest, UnlockResponse,
};

/// Shared state for vault handlers
pub struct VaultAppState<R, L> {
    pub repo: Arc<R>,
    pub activity: ActivityRecorder<L>,
    /// Read side of the activity streams
    pub activity_repo: Arc<L>,
    pub config: Arc<VaultConfig>,
    pub beacon: Arc<dyn Beacon>,
}

impl<R, L> Clone for VaultAppState<R, L> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            activity: self.activity.clone(),
            activity_repo: self.activity_repo.clone(),
            config: self.config.clone(),
            beacon: self.beacon.clone(),
        }
    }
}

impl<R, L> VaultAppState<R, L>
where
    R: VaultStore,
    L: ActivityStore,
{
    fn secrets(&self) -> SecretsUseCase<R, L> {
        SecretsUseCase::new(self.repo.clone(), self.activity.clone(), self.config.clone())
    }

    fn recipients(&self) -> RecipientsUseCase<R, L> {
        RecipientsUseCase::new(self.repo.clone(), self.activity.clone())
    }

    fn assignments(&self) -> AssignmentsUseCase<R, L> {
        AssignmentsUseCase::new(self.repo.clone(), self.activity.clone())
    }

    fn question_sets(&self) -> QuestionSetsUseCase<R, L> {
        QuestionSetsUseCase::new(
            self.repo.clone(),
            self.activity.clone(),
            self.config.clone(),
            self.beacon.clone(),
        )
    }

    fn settings(&self) -> SettingsUseCase<R, L> {
        SettingsUseCase::new(
            self.repo.clone(),
            self.activity.clone(),
            self.config.clone(),
            self.beacon.clone(),
        )
    }

    fn access(&self) -> AccessUseCase<R, L> {
        AccessUseCase::new(
            self.repo.clone(),
            self.activity.clone(),
            self.config.clone(),
            self.beacon.clone(),
        )
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /dashboard
pub async fn dashboard<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> VaultResult<Json<DashboardResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let use_case = DashboardUseCase::new(state.repo.clone(), state.activity_repo.clone());
    let overview = use_case.overview(&current.user_id).await?;
    Ok(Json(overview.into()))
}

/// GET /api/pings
pub async fn ping_history<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> VaultResult<Json<Vec<PingResponse>>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let use_case = DashboardUseCase::new(state.repo.clone(), state.activity_repo.clone());
    let pings = use_case.pings(&current.user_id).await?;
    Ok(Json(pings.iter().map(PingResponse::from).collect()))
}

// ============================================================================
// Secrets
// ============================================================================

/// GET /secrets
pub async fn list_secrets<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> VaultResult<Json<Vec<SecretSummaryResponse>>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let secrets = state.secrets().list(&current.user_id).await?;
    Ok(Json(secrets.iter().map(SecretSummaryResponse::from).collect()))
}

/// POST /secrets
pub async fn create_secret<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SecretRequest>,
) -> VaultResult<impl IntoResponse>
where
    R: VaultStore,
    L: ActivityStore,
{
    let secret = state
        .secrets()
        .create(
            &current.user_id,
            SecretInput {
                name: req.name,
                content: req.content,
            },
            &current.fingerprint,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(SecretSummaryResponse::from(&secret))))
}

/// GET /secrets/{id}
pub async fn get_secret<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<SecretId>,
) -> VaultResult<Json<SecretResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let details = state.secrets().get(&current.user_id, &id).await?;
    Ok(Json(details.into()))
}

/// PUT /secrets/{id}
pub async fn update_secret<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<SecretId>,
    Json(req): Json<SecretRequest>,
) -> VaultResult<Json<SecretUpdateResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let update = state
        .secrets()
        .update(
            &current.user_id,
            &id,
            SecretInput {
                name: req.name,
                content: req.content,
            },
            &current.fingerprint,
        )
        .await?;

    Ok(Json(SecretUpdateResponse::from(&update)))
}

/// DELETE /secrets/{id}
pub async fn delete_secret<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<SecretId>,
) -> VaultResult<StatusCode>
where
    R: VaultStore,
    L: ActivityStore,
{
    state
        .secrets()
        .delete(&current.user_id, &id, &current.fingerprint)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Recipients
// ============================================================================

fn recipient_input(req: RecipientRequest) -> RecipientInput {
    RecipientInput {
        name: req.name,
        email: req.email,
        phone: req.phone,
    }
}

/// GET /recipients
pub async fn list_recipients<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> VaultResult<Json<Vec<RecipientResponse>>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let recipients = state.recipients().list(&current.user_id).await?;
    Ok(Json(recipients.iter().map(RecipientResponse::from).collect()))
}

/// POST /recipients
pub async fn create_recipient<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<RecipientRequest>,
) -> VaultResult<impl IntoResponse>
where
    R: VaultStore,
    L: ActivityStore,
{
    let recipient = state
        .recipients()
        .create(&current.user_id, recipient_input(req), &current.fingerprint)
        .await?;

    Ok((StatusCode::CREATED, Json(RecipientResponse::from(&recipient))))
}

/// GET /recipients/{id}
pub async fn get_recipient<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<RecipientId>,
) -> VaultResult<Json<RecipientResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let recipient = state.recipients().get(&current.user_id, &id).await?;
    Ok(Json(RecipientResponse::from(&recipient)))
}

/// PUT /recipients/{id}
pub async fn update_recipient<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<RecipientId>,
    Json(req): Json<RecipientRequest>,
) -> VaultResult<Json<RecipientResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let recipient = state
        .recipients()
        .update(
            &current.user_id,
            &id,
            recipient_input(req),
            &current.fingerprint,
        )
        .await?;
    Ok(Json(RecipientResponse::from(&recipient)))
}

/// DELETE /recipients/{id}
pub async fn delete_recipient<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<RecipientId>,
) -> VaultResult<StatusCode>
where
    R: VaultStore,
    L: ActivityStore,
{
    state
        .recipients()
        .delete(&current.user_id, &id, &current.fingerprint)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Assignments
// ============================================================================

/// POST /secrets/{id}/assignments
pub async fn assign<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(secret_id): Path<SecretId>,
    Json(req): Json<AssignRequest>,
) -> VaultResult<impl IntoResponse>
where
    R: VaultStore,
    L: ActivityStore,
{
    let created = state
        .assignments()
        .assign(
            &current.user_id,
            &secret_id,
            &req.recipient_id,
            &current.fingerprint,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AssignmentCreatedResponse::from(created))))
}

/// GET /secrets/{id}/assignments
pub async fn list_assignments<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(secret_id): Path<SecretId>,
) -> VaultResult<Json<Vec<AssignmentResponse>>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let assignments = state
        .assignments()
        .list_for_secret(&current.user_id, &secret_id)
        .await?;
    Ok(Json(assignments.into_iter().map(AssignmentResponse::from).collect()))
}

/// DELETE /assignments/{id}
pub async fn unassign<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<AssignmentId>,
) -> VaultResult<StatusCode>
where
    R: VaultStore,
    L: ActivityStore,
{
    state
        .assignments()
        .unassign(&current.user_id, &id, &current.fingerprint)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Question Sets
// ============================================================================

/// POST /assignments/{id}/questions
pub async fn create_question_set<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(assignment_id): Path<AssignmentId>,
    Json(req): Json<QuestionSetRequest>,
) -> VaultResult<impl IntoResponse>
where
    R: VaultStore,
    L: ActivityStore,
{
    let input = QuestionSetInput {
        threshold: req.threshold,
        questions: req.into_pairs(),
    };
    let set = state
        .question_sets()
        .create(&current.user_id, &assignment_id, input, &current.fingerprint)
        .await?;

    let available_at = state.beacon.schedule().round_datetime(set.timelock_round);
    Ok((
        StatusCode::CREATED,
        Json(QuestionSetResponse::new(&set, available_at)),
    ))
}

/// GET /assignments/{id}/questions
pub async fn get_question_set<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(assignment_id): Path<AssignmentId>,
) -> VaultResult<Json<QuestionSetResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let set = state
        .question_sets()
        .get(&current.user_id, &assignment_id)
        .await?;

    let available_at = state.beacon.schedule().round_datetime(set.timelock_round);
    Ok(Json(QuestionSetResponse::new(&set, available_at)))
}

/// DELETE /assignments/{id}/questions
pub async fn delete_question_set<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(assignment_id): Path<AssignmentId>,
) -> VaultResult<StatusCode>
where
    R: VaultStore,
    L: ActivityStore,
{
    state
        .question_sets()
        .delete(&current.user_id, &assignment_id, &current.fingerprint)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Check-in & Settings
// ============================================================================

/// POST /api/check-in and POST /check-in
pub async fn check_in<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> VaultResult<Json<CheckInResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let method = ping_method(uri.path(), &headers);
    let use_case = CheckInUseCase::new(
        state.repo.clone(),
        state.activity.clone(),
        state.config.clone(),
        state.beacon.clone(),
    );
    let settings = use_case
        .execute(&current.user_id, method, &current.fingerprint)
        .await?;

    Ok(Json(CheckInResponse::from(&settings)))
}

/// GET /settings
pub async fn get_settings<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> VaultResult<Json<SettingsResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let settings = state.settings().get(&current.user_id).await?;
    Ok(Json(SettingsResponse::from(&settings)))
}

/// PUT /settings
pub async fn update_settings<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SettingsRequest>,
) -> VaultResult<Json<SettingsResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let settings = state
        .settings()
        .update(
            &current.user_id,
            req.check_in_interval_days,
            req.grace_period_days,
            &current.fingerprint,
        )
        .await?;
    Ok(Json(SettingsResponse::from(&settings)))
}

// ============================================================================
// Recipient Access (no session)
// ============================================================================

/// GET /access/{token}
pub async fn view_access<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Path(token): Path<String>,
) -> VaultResult<Json<AccessResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let view = state.access().view(&token).await?;
    Ok(Json(view.into()))
}

/// POST /access/{token}/unlock
pub async fn unlock_access<R, L>(
    State(state): State<VaultAppState<R, L>>,
    Path(token): Path<String>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<UnlockRequest>,
) -> VaultResult<Json<UnlockResponse>>
where
    R: VaultStore,
    L: ActivityStore,
{
    let client = recipient_fingerprint(&headers, addr);
    let unlocked = state
        .access()
        .unlock(&token, &req.answers, client.as_ref())
        .await?;

    Ok(Json(UnlockResponse {
        secret_name: unlocked.secret_name,
        content: unlocked.content,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Api for scripted check-ins, Web for the browser button
fn ping_method(path: &str, headers: &HeaderMap) -> PingMethod {
    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if path.starts_with("/api/") || wants_json {
        PingMethod::Api
    } else {
        PingMethod::Web
    }
}

/// Recipients are anonymous; a missing User-Agent just means no fingerprint
fn recipient_fingerprint(headers: &HeaderMap, addr: SocketAddr) -> Option<ClientFingerprint> {
    let client_ip = extract_client_ip(headers, Some(addr.ip()));
    extract_fingerprint(headers, client_ip).ok()
}
