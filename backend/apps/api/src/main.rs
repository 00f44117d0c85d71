//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::{AuthConfig, PgAccountRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use boundary::OpaqueIdCodec;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,boundary=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration: random secrets for development, environment
    // secrets in production (all three are independent 32-byte values)
    let (auth_config, codec) = if cfg!(debug_assertions) {
        (
            AuthConfig::with_random_secrets(),
            OpaqueIdCodec::new(random_secret()),
        )
    } else {
        let auth_config = AuthConfig {
            access_token_secret: secret_from_env("ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: secret_from_env("REFRESH_TOKEN_SECRET")?,
            ..AuthConfig::default()
        };
        let codec = OpaqueIdCodec::new(secret_from_env("OPAQUE_ID_SECRET")?);
        (auth_config, codec)
    };

    let repo = PgAccountRepository::new(pool.clone());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40810,http://127.0.0.1:40810".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_router(repo, auth_config, codec))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31181));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Decode a base64 environment variable into a 32-byte secret
fn secret_from_env(name: &str) -> anyhow::Result<[u8; 32]> {
    let value =
        env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set in production"))?;
    let bytes = Engine::decode(&general_purpose::STANDARD, value.trim())?;

    let mut secret = [0u8; 32];
    if bytes.len() != secret.len() {
        anyhow::bail!("{name} must decode to exactly {} bytes", secret.len());
    }
    secret.copy_from_slice(&bytes);
    Ok(secret)
}

/// Fresh random secret for development runs
fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&platform::crypto::random_bytes(32));
    secret
}
