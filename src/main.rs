//! Quill Server: session and authentication backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use quill_api::AppState;
use quill_auth::store::{
    MemoryRefreshTokenStore, MemoryUserStore, PgRefreshTokenStore, PgUserStore,
};
use quill_auth::{
    PasswordHasher, RefreshTokenStore, SessionProtocol, TokenCleanup, TokenSigner, UserStore,
};
use quill_core::config::{AppConfig, StoreProvider};
use quill_core::error::AppError;
use quill_database::DatabasePool;
use quill_database::repositories::{RefreshTokenRepository, UserRepository};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("QUILL_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// The two stores the session protocol runs on.
struct Stores {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    pool: Option<DatabasePool>,
}

/// Connect the configured backend, running migrations for PostgreSQL.
async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    match config.database.provider {
        StoreProvider::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            quill_database::migration::run_migrations(pool.pool()).await?;

            let users = Arc::new(UserRepository::new(pool.pool().clone()));
            let tokens = Arc::new(RefreshTokenRepository::new(pool.pool().clone()));

            Ok(Stores {
                users: Arc::new(PgUserStore::new(users)),
                tokens: Arc::new(PgRefreshTokenStore::new(tokens)),
                pool: Some(pool),
            })
        }
        StoreProvider::Memory => {
            tracing::warn!("Using in-memory stores; all users and sessions are lost on exit");
            Ok(Stores {
                users: Arc::new(MemoryUserStore::new()),
                tokens: Arc::new(MemoryRefreshTokenStore::new()),
                pool: None,
            })
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Quill v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let stores = open_stores(&config).await?;

    // ── Step 2: Auth ─────────────────────────────────────────────
    let signer = Arc::new(TokenSigner::new(&config.auth));
    let hasher = Arc::new(PasswordHasher::new(&config.auth)?);
    let protocol = Arc::new(SessionProtocol::new(
        signer,
        Arc::clone(&stores.users),
        Arc::clone(&stores.tokens),
        hasher,
    ));

    // ── Step 3: Background cleanup ───────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let cleanup_handle = match config.auth.token_cleanup_interval_seconds {
        0 => {
            tracing::info!("Refresh token cleanup disabled");
            None
        }
        seconds => Some(
            TokenCleanup::new(Arc::clone(&stores.tokens))
                .spawn(Duration::from_secs(seconds), shutdown_rx),
        ),
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = quill_api::build_app(AppState::new(Arc::new(config), protocol));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Quill server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            quill_api::app::shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Drain ────────────────────────────────────────────
    if let Some(handle) = cleanup_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    if let Some(pool) = stores.pool {
        pool.close().await;
    }

    tracing::info!("Quill server stopped");
    Ok(())
}
