//! Auth Middleware
//!
//! Guards protected routes and hands the signed-in user to handlers through
//! request extensions.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::id::UserId;
use platform::client::{ClientFingerprint, extract_client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;
use uuid::Uuid;

use crate::application::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::AuthSessionRepository;
use crate::domain::value_object::public_id::PublicId;
use crate::error::AuthError;

/// The authenticated caller, inserted by [`require_auth_session`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub public_id: PublicId,
    pub session_id: Uuid,
    pub fingerprint: ClientFingerprint,
}

pub struct AuthMiddlewareState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> AuthMiddlewareState<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

/// Middleware that requires a valid auth session
///
/// Use with `axum::middleware::from_fn_with_state`. Requests without a
/// valid session get 401 and `X-Auth-Required: true`.
pub async fn require_auth_session<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: AuthSessionRepository + Send + Sync + 'static,
{
    let headers = req.headers();

    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client_ip = extract_client_ip(headers, direct_ip);

    let fingerprint = match extract_fingerprint(headers, client_ip) {
        Ok(fp) => fp,
        Err(e) => return Err(AuthError::from(e).into_response()),
    };

    let Some(token) = extract_cookie(headers, &state.config.session_cookie_name) else {
        return Err(auth_required());
    };

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    let session = match use_case.get_session(&token, &fingerprint.hash).await {
        Ok(session) => session,
        Err(AuthError::Database(e)) => {
            return Err(AuthError::Database(e).into_response());
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session");
            return Err(auth_required());
        }
    };

    req.extensions_mut().insert(CurrentUser {
        user_id: session.user_id,
        public_id: session.public_id,
        session_id: session.session_id,
        fingerprint,
    });

    Ok(next.run(req).await)
}

fn auth_required() -> Response {
    (StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response()
}
