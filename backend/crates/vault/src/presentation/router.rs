//! Vault Router

use std::sync::Arc;

use activity::{ActivityRecorder, ActivityStore, PgActivityRepository};
use auth::domain::repository::AuthSessionRepository;
use auth::{AuthMiddlewareState, PgAuthRepository, require_auth_session};
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use platform::timelock::Beacon;

use crate::application::config::VaultConfig;
use crate::domain::repository::VaultStore;
use crate::infra::postgres::PgVaultRepository;
use crate::presentation::handlers::{self, VaultAppState};

/// Create the Vault router with PostgreSQL repositories
pub fn vault_router(
    repo: PgVaultRepository,
    activity: PgActivityRepository,
    guard: AuthMiddlewareState<PgAuthRepository>,
    config: VaultConfig,
) -> Router {
    let beacon: Arc<dyn Beacon> = Arc::new(config.beacon());
    vault_router_generic(repo, activity, guard, config, beacon)
}

/// Create a generic Vault router; `guard` resolves sessions for the
/// protected routes
pub fn vault_router_generic<R, L, S>(
    repo: R,
    activity: L,
    guard: AuthMiddlewareState<S>,
    config: VaultConfig,
    beacon: Arc<dyn Beacon>,
) -> Router
where
    R: VaultStore,
    L: ActivityStore,
    S: AuthSessionRepository + Send + Sync + 'static,
{
    let activity = Arc::new(activity);
    let state = VaultAppState {
        repo: Arc::new(repo),
        activity: ActivityRecorder::new(activity.clone()),
        activity_repo: activity,
        config: Arc::new(config),
        beacon,
    };

    let protected = Router::new()
        .route("/dashboard", get(handlers::dashboard::<R, L>))
        .route(
            "/secrets",
            get(handlers::list_secrets::<R, L>).post(handlers::create_secret::<R, L>),
        )
        .route(
            "/secrets/{id}",
            get(handlers::get_secret::<R, L>)
                .put(handlers::update_secret::<R, L>)
                .delete(handlers::delete_secret::<R, L>),
        )
        .route(
            "/secrets/{id}/assignments",
            get(handlers::list_assignments::<R, L>).post(handlers::assign::<R, L>),
        )
        .route("/assignments/{id}", delete(handlers::unassign::<R, L>))
        .route(
            "/assignments/{id}/questions",
            get(handlers::get_question_set::<R, L>)
                .post(handlers::create_question_set::<R, L>)
                .delete(handlers::delete_question_set::<R, L>),
        )
        .route(
            "/recipients",
            get(handlers::list_recipients::<R, L>).post(handlers::create_recipient::<R, L>),
        )
        .route(
            "/recipients/{id}",
            get(handlers::get_recipient::<R, L>)
                .put(handlers::update_recipient::<R, L>)
                .delete(handlers::delete_recipient::<R, L>),
        )
        .route("/check-in", post(handlers::check_in::<R, L>))
        .route("/api/check-in", post(handlers::check_in::<R, L>))
        .route("/api/pings", get(handlers::ping_history::<R, L>))
        .route(
            "/settings",
            get(handlers::get_settings::<R, L>).put(handlers::update_settings::<R, L>),
        )
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_auth_session::<S>,
        ));

    Router::new()
        .route("/access/{token}", get(handlers::view_access::<R, L>))
        .route("/access/{token}/unlock", post(handlers::unlock_access::<R, L>))
        .merge(protected)
        .with_state(state)
}
