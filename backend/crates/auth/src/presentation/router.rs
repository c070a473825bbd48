//! Auth Router

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, PgActivityRepository};
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::application::config::AuthConfig;
use crate::application::passkeys::PasskeyService;
use crate::domain::repository::AuthStore;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth_session};

/// Create the Auth router with PostgreSQL repositories
pub fn auth_router(
    repo: PgAuthRepository,
    activity: PgActivityRepository,
    config: AuthConfig,
    passkeys: Arc<PasskeyService>,
) -> Router {
    auth_router_generic(repo, activity, config, passkeys)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, L>(
    repo: R,
    activity: L,
    config: AuthConfig,
    passkeys: Arc<PasskeyService>,
) -> Router
where
    R: AuthStore,
    L: ActivityStore,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        activity: ActivityRecorder::new(Arc::new(activity)),
        config: Arc::new(config),
        passkeys,
    };
    let guard = AuthMiddlewareState::new(state.repo.clone(), state.config.clone());

    let protected = Router::new()
        .route("/2fa/setup", post(handlers::totp_setup::<R, L>))
        .route("/2fa/verify", post(handlers::totp_verify::<R, L>))
        .route("/2fa/disable", post(handlers::totp_disable::<R, L>))
        .route("/profile/passkeys", get(handlers::list_passkeys::<R, L>))
        .route(
            "/profile/passkeys/register/begin",
            post(handlers::passkey_register_begin::<R, L>),
        )
        .route(
            "/profile/passkeys/register/finish",
            post(handlers::passkey_register_finish::<R, L>),
        )
        .route(
            "/profile/passkeys/{credential_id}",
            delete(handlers::delete_passkey::<R, L>),
        )
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_auth_session::<R>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<R, L>))
        .route("/login", post(handlers::login::<R, L>))
        .route("/logout", post(handlers::logout::<R, L>))
        .route("/session", get(handlers::session_status::<R, L>))
        .route(
            "/login/passkey/begin",
            post(handlers::passkey_login_begin::<R, L>),
        )
        .route(
            "/login/passkey/finish",
            post(handlers::passkey_login_finish::<R, L>),
        )
        .merge(protected)
        .with_state(state)
}
