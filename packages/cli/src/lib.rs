// ABOUTME: Server assembly and maintenance commands for LaundryLens
// ABOUTME: Builds the layered axum app, runs the HTTP server, migrations, and catalog seeding

pub mod error;
pub mod middleware;

use std::net::SocketAddr;

use axum::Router;
use laundrylens_api::{create_router, AppState};
use laundrylens_catalog::{seed_catalog, SeedReport};
use laundrylens_config::Config;
use laundrylens_storage::connect;
use sqlx::SqlitePool;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use error::{CliError, CliResult};
use middleware::{create_cors_layer, create_panic_handler};

/// Application router with request tracing, CORS, and panic recovery applied
pub fn build_app(pool: SqlitePool, config: &Config) -> CliResult<Router> {
    let state = AppState::new(pool, config)?;
    let cors = create_cors_layer(&config.server.cors_origin)?;

    Ok(create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(create_panic_handler()))
}

async fn open_database(config: &Config) -> CliResult<SqlitePool> {
    Ok(connect(&config.database.url, config.database.max_connections).await?)
}

/// Serve the API until Ctrl+C or SIGTERM. `port` overrides the configured port.
pub async fn run_server(config: Config, port: Option<u16>) -> CliResult<()> {
    let pool = open_database(&config).await?;
    let app = build_app(pool, &config)?;

    let port = port.unwrap_or(config.server.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "LaundryLens listening on {} ({:?})",
        addr, config.server.environment
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Bring the database schema up to date
pub async fn run_migrations(config: &Config) -> CliResult<()> {
    let pool = open_database(config).await?;
    pool.close().await;
    info!("Database schema is up to date");
    Ok(())
}

/// Load the bundled symbol and material catalog
pub async fn run_seed(config: &Config) -> CliResult<SeedReport> {
    let pool = open_database(config).await?;
    let report = seed_catalog(&pool).await?;
    pool.close().await;

    info!(
        "Seeded {} symbols, {} translations, {} materials, {} material links",
        report.symbols, report.translations, report.materials, report.material_symbols
    );
    Ok(report)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
