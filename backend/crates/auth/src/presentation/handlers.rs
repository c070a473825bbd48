//! HTTP Handlers

use std::net::SocketAddr;
use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore};
use axum::Json;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::Extension;
use kernel::error::app_error::OptionExt;
use kernel::error::kind::ErrorKind;
use platform::client::{ClientFingerprint, extract_client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{
    CheckSessionUseCase, PasskeyRegistrationInput, PasskeyService, PasskeySetupUseCase,
    PasskeySignInUseCase, SignInInput, SignInOutput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase, TotpSetupUseCase,
};
use crate::domain::repository::{AuthStore, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, PasskeyLoginBeginRequest, PasskeyLoginBeginResponse,
    PasskeyLoginFinishRequest, PasskeyRegisterBeginResponse, PasskeyRegisterFinishRequest,
    PasskeyResponse, RegisterRequest, RegisterResponse, SessionStatusResponse, TotpCodeRequest,
    TotpSetupResponse, decode_credential_id,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
pub struct AuthAppState<R, L> {
    pub repo: Arc<R>,
    pub activity: ActivityRecorder<L>,
    pub config: Arc<AuthConfig>,
    pub passkeys: Arc<PasskeyService>,
}

impl<R, L> Clone for AuthAppState<R, L> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            activity: self.activity.clone(),
            config: self.config.clone(),
            passkeys: self.passkeys.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    L: ActivityStore,
{
    let fingerprint = client_fingerprint(&headers, addr)?;
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.activity.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            SignUpInput {
                email: req.email,
                password: req.password,
            },
            &fingerprint,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            public_id: output.public_id,
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
pub async fn login<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    L: ActivityStore,
{
    let fingerprint = client_fingerprint(&headers, addr)?;
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.activity.clone(),
        state.config.clone(),
    );

    let remember_me = req.remember_me;
    let output = use_case
        .execute(
            SignInInput {
                email: req.email,
                password: req.password,
                remember_me,
                totp_code: req.totp_code,
            },
            &fingerprint,
        )
        .await?;

    if output.requires_2fa {
        // No cookie until the second factor is supplied
        return Ok((
            StatusCode::OK,
            Json(LoginResponse {
                public_id: output.public_id,
                requires_2fa: true,
                expires_at_ms: None,
            }),
        )
            .into_response());
    }

    Ok(session_response(&state.config, output, remember_me))
}

/// POST /logout
pub async fn logout<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse
where
    R: AuthStore,
    L: ActivityStore,
{
    let token = extract_cookie(&headers, &state.config.session_cookie_name);
    let fingerprint = client_fingerprint(&headers, addr);

    if let (Some(token), Ok(fingerprint)) = (token, fingerprint) {
        let use_case = SignOutUseCase::new(
            state.repo.clone(),
            state.activity.clone(),
            state.config.clone(),
        );
        // The cookie is cleared either way
        if let Err(e) = use_case.execute(&token, &fingerprint).await {
            tracing::debug!(error = %e, "Sign out without a valid session");
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.config.cookie().build_delete_cookie())],
    )
}

/// GET /session
pub async fn session_status<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: AuthStore,
    L: ActivityStore,
{
    let Some(token) = extract_cookie(&headers, &state.config.session_cookie_name) else {
        return Ok(Json(SessionStatusResponse::anonymous()));
    };
    let Ok(fingerprint) = client_fingerprint(&headers, addr) else {
        return Ok(Json(SessionStatusResponse::anonymous()));
    };

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    let session = match use_case.get_session(&token, &fingerprint.hash).await {
        Ok(session) => session,
        Err(AuthError::Database(e)) => return Err(AuthError::Database(e)),
        Err(_) => return Ok(Json(SessionStatusResponse::anonymous())),
    };

    let user = UserRepository::find_by_id(state.repo.as_ref(), &session.user_id).await?;

    Ok(Json(SessionStatusResponse {
        authenticated: true,
        public_id: Some(session.public_id.to_string()),
        email: user.map(|u| u.email.as_str().to_string()),
        expires_at_ms: Some(session.expires_at_ms),
    }))
}

// ============================================================================
// TOTP (requires authentication)
// ============================================================================

/// POST /2fa/setup
pub async fn totp_setup<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<Json<TotpSetupResponse>>
where
    R: AuthStore,
    L: ActivityStore,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.activity.clone());
    let output = use_case.setup(&current.user_id).await?;

    Ok(Json(TotpSetupResponse {
        qr_code: output.qr_code_base64,
        secret: output.secret,
        otpauth_url: output.otpauth_url,
    }))
}

/// POST /2fa/verify
pub async fn totp_verify<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<TotpCodeRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    L: ActivityStore,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.activity.clone());
    use_case
        .verify(&current.user_id, &req.code, &current.fingerprint)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /2fa/disable
pub async fn totp_disable<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<TotpCodeRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    L: ActivityStore,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.activity.clone());
    use_case
        .disable(&current.user_id, &req.code, &current.fingerprint)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Passkey management (requires authentication)
// ============================================================================

/// GET /profile/passkeys
pub async fn list_passkeys<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<Json<Vec<PasskeyResponse>>>
where
    R: AuthStore,
    L: ActivityStore,
{
    let use_case = passkey_setup(&state);
    let passkeys = use_case.list(&current.user_id).await?;

    Ok(Json(passkeys.iter().map(PasskeyResponse::from).collect()))
}

/// POST /profile/passkeys/register/begin
pub async fn passkey_register_begin<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<Json<PasskeyRegisterBeginResponse>>
where
    R: AuthStore,
    L: ActivityStore,
{
    let use_case = passkey_setup(&state);
    let (registration_id, options) = use_case
        .register_begin(&current.user_id, current.session_id)
        .await?;

    Ok(Json(PasskeyRegisterBeginResponse {
        registration_id,
        options,
    }))
}

/// POST /profile/passkeys/register/finish
pub async fn passkey_register_finish<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<PasskeyRegisterFinishRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    L: ActivityStore,
{
    let use_case = passkey_setup(&state);
    let credential = use_case
        .register_finish(
            &current.user_id,
            current.session_id,
            PasskeyRegistrationInput {
                registration_id: req.registration_id,
                label: req.label,
                credential: req.credential,
            },
            &current.fingerprint,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PasskeyResponse::from(&credential))))
}

/// DELETE /profile/passkeys/{credential_id}
pub async fn delete_passkey<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(current): Extension<CurrentUser>,
    Path(credential_id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    L: ActivityStore,
{
    let credential_id = decode_credential_id(&credential_id)
        .ok_or_app_err(ErrorKind::BadRequest, "Invalid credential id")?;

    let use_case = passkey_setup(&state);
    use_case
        .delete(&current.user_id, &credential_id, &current.fingerprint)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Passkey login
// ============================================================================

/// POST /login/passkey/begin
pub async fn passkey_login_begin<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Json(req): Json<PasskeyLoginBeginRequest>,
) -> AuthResult<Json<PasskeyLoginBeginResponse>>
where
    R: AuthStore,
    L: ActivityStore,
{
    let use_case = passkey_sign_in(&state);
    let (authentication_id, options) = use_case.begin(&req.email).await?;

    Ok(Json(PasskeyLoginBeginResponse {
        authentication_id,
        options,
    }))
}

/// POST /login/passkey/finish
pub async fn passkey_login_finish<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<PasskeyLoginFinishRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    L: ActivityStore,
{
    let fingerprint = client_fingerprint(&headers, addr)?;
    let use_case = passkey_sign_in(&state);
    let output = use_case
        .finish(req.authentication_id, &req.credential, &fingerprint)
        .await?;

    Ok(session_response(&state.config, output, false))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn client_fingerprint(headers: &HeaderMap, addr: SocketAddr) -> AuthResult<ClientFingerprint> {
    let client_ip = extract_client_ip(headers, Some(addr.ip()));
    Ok(extract_fingerprint(headers, client_ip)?)
}

fn passkey_setup<R, L>(state: &AuthAppState<R, L>) -> PasskeySetupUseCase<R, L>
where
    R: AuthStore,
    L: ActivityStore,
{
    PasskeySetupUseCase::new(
        state.repo.clone(),
        state.activity.clone(),
        state.passkeys.clone(),
    )
}

fn passkey_sign_in<R, L>(state: &AuthAppState<R, L>) -> PasskeySignInUseCase<R, L>
where
    R: AuthStore,
    L: ActivityStore,
{
    PasskeySignInUseCase::new(
        state.repo.clone(),
        state.activity.clone(),
        state.passkeys.clone(),
        state.config.clone(),
    )
}

/// 200 with the session cookie; Max-Age follows `remember_me`
fn session_response(
    config: &AuthConfig,
    output: SignInOutput,
    remember_me: bool,
) -> axum::response::Response {
    let max_age = config.session_ttl(remember_me).as_secs();
    let cookie = config
        .cookie()
        .build_set_cookie(&output.session_token, Some(max_age));

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            public_id: output.public_id,
            requires_2fa: false,
            expires_at_ms: Some(output.expires_at_ms),
        }),
    )
        .into_response()
}
