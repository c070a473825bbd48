//! API Server Entry Point
//!
//! Reads configuration from the environment, prepares the database and
//! serves the auth and vault routers. Startup uses `anyhow`; request-level
//! errors go through `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use activity::{ActivityRecorder, PgActivityRepository};
use anyhow::{Context, bail};
use auth::domain::repository::AuthSessionRepository;
use auth::{AuthConfig, AuthMiddlewareState, PasskeyConfig, PasskeyService, PgAuthRepository};
use axum::routing::get;
use axum::{
    Json, Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use platform::seal::SealingKey;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vault::{LogNotifier, PgVaultRepository, ReleaseScheduler, VaultConfig, vault_router};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,vault=info,activity=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup; failures must not block the server
    let auth_repo = PgAuthRepository::new(pool.clone());
    match auth_repo.cleanup_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Auth session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
        }
    }

    let auth_config = auth_config()?;
    let vault_config = vault_config()?;
    let passkeys = Arc::new(
        PasskeyService::new(&auth_config.passkey).context("Invalid WebAuthn configuration")?,
    );

    let activity_repo = PgActivityRepository::new(pool.clone());
    let vault_repo = PgVaultRepository::new(pool.clone());

    // Release scheduler
    let scheduler = ReleaseScheduler::new(
        Arc::new(vault_repo.clone()),
        ActivityRecorder::new(Arc::new(activity_repo.clone())),
        Arc::new(LogNotifier),
        vault_config.release_scan_interval,
    );
    tokio::spawn(scheduler.run());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let guard = AuthMiddlewareState::new(Arc::new(auth_repo.clone()), Arc::new(auth_config.clone()));
    let app = Router::new()
        .route("/health", get(health))
        .merge(auth::auth_router(
            auth_repo,
            activity_repo.clone(),
            auth_config,
            passkeys,
        ))
        .merge(vault_router(vault_repo, activity_repo, guard, vault_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("BIND_ADDR must be host:port")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received");
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };
    config.session_secret = required_key("SESSION_SECRET", config.session_secret)?;
    config.password_pepper = env::var("PASSWORD_PEPPER")
        .ok()
        .filter(|p| !p.is_empty())
        .map(String::into_bytes);

    let mut passkey = PasskeyConfig::default();
    if let Ok(rp_id) = env::var("WEBAUTHN_RP_ID") {
        passkey.rp_id = rp_id;
    }
    if let Ok(origin) = env::var("WEBAUTHN_RP_ORIGIN") {
        passkey.rp_origin = origin;
    }
    if let Ok(name) = env::var("WEBAUTHN_RP_NAME") {
        passkey.rp_name = name;
    }
    config.passkey = passkey;
    Ok(config)
}

fn vault_config() -> anyhow::Result<VaultConfig> {
    let mut config = if cfg!(debug_assertions) {
        VaultConfig::development()
    } else {
        VaultConfig::default()
    };
    config.master_key =
        SealingKey::from_bytes(required_key("MASTER_KEY", *config.master_key.as_bytes())?);
    config.beacon_secret = required_key("BEACON_SECRET", config.beacon_secret)?;
    if let Ok(secs) = env::var("RELEASE_SCAN_INTERVAL_SECS") {
        let secs: u64 = secs
            .parse()
            .context("RELEASE_SCAN_INTERVAL_SECS must be a number of seconds")?;
        config.release_scan_interval = Duration::from_secs(secs.max(1));
    }
    Ok(config)
}

/// 32-byte base64 key from the environment. Debug builds fall back to
/// `dev_default`; release builds require the variable.
fn required_key(name: &str, dev_default: [u8; 32]) -> anyhow::Result<[u8; 32]> {
    let Ok(encoded) = env::var(name) else {
        if cfg!(debug_assertions) {
            tracing::warn!(variable = name, "Not set, using a random development key");
            return Ok(dev_default);
        }
        bail!("{name} must be set in production");
    };
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .with_context(|| format!("{name} must be base64"))?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("{name} must decode to 32 bytes"))
}
