//! KLK Auto Car - Rental API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin rental-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... API_STORAGE_URL=https://... cargo run --bin rental-api
//!
//! # Print an admin token for the console
//! cargo run --bin rental-api -- issue-token agence@klk-autocar.ma
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` / `API_PORT` - Listen address (default: 0.0.0.0:8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_STORAGE_URL` / `API_STORAGE_KEY` - Hosted storage project and key
//! * `API_HANDOFF_PHONE` - Agency WhatsApp number
//! * `API_REJECT_OVERLAPPING_BOOKINGS` - Refuse double-booked vehicles (default: false)
//! * `API_SESSION_IDLE_SECS` / `API_SESSION_SWEEP_SECS` - Drop wizard sessions unused this long, checked this often (default: 7200 / 60)
//! * `API_LOG_LEVEL` / `API_LOG_FORMAT` - Log filter and `pretty` or `json`

use std::net::SocketAddr;

use anyhow::{bail, Context};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{create_pool, DatabaseConfig};
use infra_storage::{StorageConfig, SupabaseObjectStore};
use interface_api::auth::admin_token;
use interface_api::{config::ApiConfig, create_router, Adapters, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_ configuration")?;

    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        return match command.as_str() {
            "issue-token" => {
                let subject = args.next().unwrap_or_else(|| "admin".to_string());
                let token = admin_token(&subject, &config.jwt_secret, config.jwt_expiration_secs)?;
                println!("{}", token);
                Ok(())
            }
            other => bail!("unknown command '{}'", other),
        };
    }

    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting KLK Auto Car rental API"
    );

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone()).run_migrations(config.run_migrations),
    )
    .await
    .context("database unavailable")?;

    let store = SupabaseObjectStore::new(StorageConfig::new(
        config.storage_url.clone(),
        config.storage_key.clone(),
    ))
    .context("invalid storage configuration")?;

    let state = AppState::new(config.clone(), Adapters::live(pool, store))?;
    let sweeper = state
        .sessions
        .spawn_sweeper(config.session_idle(), config.session_sweep_period());
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sweeper.abort();

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber, JSON lines when `API_LOG_FORMAT=json`
fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
