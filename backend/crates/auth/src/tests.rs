//! Auth flow tests against in-memory repositories

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use activity::{
    ActivityResult, AuditLog, AuditLogRepository, PingHistory, PingHistoryRepository,
};
use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use kernel::id::UserId;
use platform::client::ClientFingerprint;
use platform::crypto::sha256;
use tower::ServiceExt;
use uuid::Uuid;

use crate::application::config::{AuthConfig, PasskeyConfig};
use crate::application::passkeys::PasskeyService;
use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, passkey::PasskeyCredential, user::User,
};
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, PasskeyRepository, UserRepository,
};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use crate::presentation::router::auth_router_generic;

const USER_AGENT: &str = "deadswitch-tests/1.0";
const PASSWORD: &str = "Velvet-Otter-Lantern-42";

// ============================================================================
// In-memory repositories
// ============================================================================

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    auths: HashMap<UserId, Auth>,
    sessions: HashMap<Uuid, AuthSession>,
    passkeys: Vec<PasskeyCredential>,
}

#[derive(Clone, Default)]
struct MemoryAuthStore {
    state: Arc<Mutex<MemoryState>>,
}

impl UserRepository for MemoryAuthStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().any(|u| &u.email == email))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }
}

impl AuthRepository for MemoryAuthStore {
    async fn create(&self, auth: &Auth) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        state.auths.insert(auth.user_id, auth.clone());
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        Ok(self.state.lock().unwrap().auths.get(user_id).cloned())
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        state.auths.insert(auth.user_id, auth.clone());
        Ok(())
    }
}

impl AuthSessionRepository for MemoryAuthStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        state.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let state = self.state.lock().unwrap();
        match state.sessions.get(&session_id) {
            Some(s) if s.client_fingerprint_hash != fingerprint_hash => {
                Err(AuthError::SessionFingerprintMismatch)
            }
            other => Ok(other.cloned()),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        state.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.state.lock().unwrap().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| &s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut state = self.state.lock().unwrap();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at_ms >= now_ms);
        Ok((before - state.sessions.len()) as u64)
    }
}

impl PasskeyRepository for MemoryAuthStore {
    async fn create(&self, credential: &PasskeyCredential) -> AuthResult<()> {
        self.state.lock().unwrap().passkeys.push(credential.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> AuthResult<Vec<PasskeyCredential>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .passkeys
            .iter()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_credential_id(
        &self,
        credential_id: &[u8],
    ) -> AuthResult<Option<PasskeyCredential>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .passkeys
            .iter()
            .find(|c| c.credential_id == credential_id)
            .cloned())
    }

    async fn update(&self, credential: &PasskeyCredential) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .passkeys
            .iter_mut()
            .find(|c| c.credential_id == credential.credential_id)
        {
            *existing = credential.clone();
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, credential_id: &[u8]) -> AuthResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.passkeys.len();
        state
            .passkeys
            .retain(|c| !(&c.user_id == user_id && c.credential_id == credential_id));
        Ok(state.passkeys.len() < before)
    }
}

#[derive(Clone, Default)]
struct MemoryActivity {
    audits: Arc<Mutex<Vec<AuditLog>>>,
}

impl MemoryActivity {
    fn actions(&self) -> Vec<String> {
        let audits = self.audits.lock().unwrap();
        audits.iter().map(|a| a.action.clone()).collect()
    }
}

impl AuditLogRepository for MemoryActivity {
    async fn record(&self, entry: &AuditLog) -> ActivityResult<()> {
        self.audits.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId, limit: i64) -> ActivityResult<Vec<AuditLog>> {
        let audits = self.audits.lock().unwrap();
        Ok(audits
            .iter()
            .rev()
            .filter(|a| &a.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

impl PingHistoryRepository for MemoryActivity {
    async fn record(&self, _ping: &PingHistory) -> ActivityResult<()> {
        Ok(())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
        _limit: i64,
    ) -> ActivityResult<Vec<PingHistory>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    app: Router,
    store: MemoryAuthStore,
    activity: MemoryActivity,
}

fn harness() -> Harness {
    let store = MemoryAuthStore::default();
    let activity = MemoryActivity::default();
    let passkeys = Arc::new(PasskeyService::new(&PasskeyConfig::default()).unwrap());
    let app = auth_router_generic(
        store.clone(),
        activity.clone(),
        AuthConfig::development(),
        passkeys,
    )
    .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));

    Harness {
        app,
        store,
        activity,
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, USER_AGENT);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::USER_AGENT, USER_AGENT);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` pair of the Set-Cookie header
fn session_cookie(response: &axum::response::Response) -> Option<String> {
    let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = value.split(';').next()?.to_string();
    (!pair.ends_with('=')).then_some(pair)
}

async fn register(app: &Router, email: &str) -> StatusCode {
    let body = serde_json::json!({ "email": email, "password": PASSWORD });
    app.clone()
        .oneshot(json_request("POST", "/register", body, None))
        .await
        .unwrap()
        .status()
}

async fn login(app: &Router, email: &str, password: &str) -> axum::response::Response {
    let body = serde_json::json!({ "email": email, "password": password });
    app.clone()
        .oneshot(json_request("POST", "/login", body, None))
        .await
        .unwrap()
}

fn test_client() -> ClientFingerprint {
    ClientFingerprint::new(sha256(USER_AGENT.as_bytes()), None, Some(USER_AGENT.to_string()))
}

// ============================================================================
// Register / Login
// ============================================================================

#[tokio::test]
async fn test_register_then_duplicate_conflicts() {
    let h = harness();

    assert_eq!(register(&h.app, "alice@example.com").await, StatusCode::CREATED);
    assert_eq!(register(&h.app, "Alice@Example.com").await, StatusCode::CONFLICT);
    assert_eq!(h.activity.actions(), vec!["register".to_string()]);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let h = harness();

    assert_eq!(register(&h.app, "not-an-email").await, StatusCode::BAD_REQUEST);

    let body = serde_json::json!({ "email": "bob@example.com", "password": "short" });
    let response = h
        .app
        .clone()
        .oneshot(json_request("POST", "/register", body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_cookie_and_session_reports_user() {
    let h = harness();
    register(&h.app, "carol@example.com").await;

    let response = login(&h.app, "carol@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("session cookie");
    assert!(cookie.starts_with("session_token="));

    let response = h
        .app
        .clone()
        .oneshot(empty_request("GET", "/session", Some(&cookie)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["email"], "carol@example.com");

    let response = h
        .app
        .clone()
        .oneshot(empty_request("GET", "/session", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["authenticated"], false);

    assert!(h.activity.actions().contains(&"login".to_string()));
}

#[tokio::test]
async fn test_wrong_password_then_lockout() {
    let h = harness();
    register(&h.app, "dave@example.com").await;

    for _ in 0..Auth::MAX_LOGIN_FAILURES {
        let response = login(&h.app, "dave@example.com", "Wrong-Password-123").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = login(&h.app, "dave@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::LOCKED);
    assert!(h.activity.actions().contains(&"login_failed".to_string()));
}

#[tokio::test]
async fn test_unknown_email_is_unauthorized() {
    let h = harness();
    let response = login(&h.app, "nobody@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie_and_session() {
    let h = harness();
    register(&h.app, "erin@example.com").await;
    let response = login(&h.app, "erin@example.com", PASSWORD).await;
    let cookie = session_cookie(&response).unwrap();

    let response = h
        .app
        .clone()
        .oneshot(empty_request("POST", "/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));

    assert!(h.store.state.lock().unwrap().sessions.is_empty());
    assert!(h.activity.actions().contains(&"logout".to_string()));
}

// ============================================================================
// Protected routes
// ============================================================================

#[tokio::test]
async fn test_protected_route_requires_session() {
    let h = harness();

    let response = h
        .app
        .clone()
        .oneshot(empty_request("POST", "/2fa/setup", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["X-Auth-Required"], "true");

    let response = h
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/profile/passkeys",
            Some("session_token=forged.token"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_bound_to_user_agent() {
    let h = harness();
    register(&h.app, "frank@example.com").await;
    let cookie = session_cookie(&login(&h.app, "frank@example.com", PASSWORD).await).unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/profile/passkeys")
        .header(header::USER_AGENT, "another-browser")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_two_factor_flow() {
    let h = harness();
    register(&h.app, "grace@example.com").await;
    let cookie = session_cookie(&login(&h.app, "grace@example.com", PASSWORD).await).unwrap();

    let response = h
        .app
        .clone()
        .oneshot(empty_request("POST", "/2fa/setup", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let setup = body_json(response).await;
    assert!(setup["otpauthUrl"].as_str().unwrap().starts_with("otpauth://"));

    let secret = {
        let state = h.store.state.lock().unwrap();
        state.auths.values().next().unwrap().totp_secret.clone().unwrap()
    };
    let code = secret.current_code("grace@example.com").unwrap();

    let response = h
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/2fa/verify",
            serde_json::json!({ "code": code }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Password alone now asks for the second factor without a cookie
    let response = login(&h.app, "grace@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    assert_eq!(body_json(response).await["requires2fa"], true);

    let body = serde_json::json!({
        "email": "grace@example.com",
        "password": PASSWORD,
        "totpCode": "000000x",
    });
    let response = h
        .app
        .clone()
        .oneshot(json_request("POST", "/login", body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = serde_json::json!({
        "email": "grace@example.com",
        "password": PASSWORD,
        "totpCode": secret.current_code("grace@example.com").unwrap(),
    });
    let response = h
        .app
        .clone()
        .oneshot(json_request("POST", "/login", body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());

    assert!(h.activity.actions().contains(&"2fa_enabled".to_string()));
}

// ============================================================================
// Passkeys
// ============================================================================

#[tokio::test]
async fn test_passkey_login_without_credentials_is_unauthorized() {
    let h = harness();
    register(&h.app, "heidi@example.com").await;

    let response = h
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login/passkey/begin",
            serde_json::json!({ "email": "heidi@example.com" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_passkey_register_begin_and_foreign_delete() {
    let h = harness();
    register(&h.app, "ivan@example.com").await;
    let cookie = session_cookie(&login(&h.app, "ivan@example.com", PASSWORD).await).unwrap();

    let response = h
        .app
        .clone()
        .oneshot(empty_request(
            "POST",
            "/profile/passkeys/register/begin",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["registrationId"].is_string());
    assert!(json["options"]["publicKey"]["challenge"].is_string());

    let response = h
        .app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            "/profile/passkeys/AAECAw",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = h
        .app
        .clone()
        .oneshot(empty_request("GET", "/profile/passkeys", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

// ============================================================================
// Use cases
// ============================================================================

#[tokio::test]
async fn test_check_session_rejects_expired() {
    use crate::application::{CheckSessionUseCase, session_token};
    use crate::domain::value_object::public_id::PublicId;

    let store = Arc::new(MemoryAuthStore::default());
    let config = Arc::new(AuthConfig::development());
    let client = test_client();

    let mut session = AuthSession::new(
        UserId::new(),
        PublicId::new(),
        false,
        &client,
        chrono::Duration::hours(1),
    );
    session.expires_at_ms = Utc::now().timestamp_millis() - 1;
    AuthSessionRepository::create(store.as_ref(), &session)
        .await
        .unwrap();

    let token = session_token::issue(&config.session_secret, session.session_id).unwrap();
    let use_case = CheckSessionUseCase::new(store.clone(), config);
    let err = use_case.get_session(&token, &client.hash).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionInvalid));
    assert!(store.state.lock().unwrap().sessions.is_empty());
}
