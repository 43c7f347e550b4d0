//! Fleet simulator server.
//!
//! Wires the `PostgreSQL` gateway, the simulation registry, and the HTTP
//! control API together and runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `fleetsim-config.yaml` (or `FLEETSIM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run migrations
//! 4. Create the simulation registry
//! 5. Serve the control API until `Ctrl-C`
//! 6. Stop every simulation and close the pool

mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fleetsim_api::{AppState, ServerConfig};
use fleetsim_core::config::LoggingConfig;
use fleetsim_core::{FleetConfig, SimulationRegistry};
use fleetsim_db::{PgVesselGateway, PostgresConfig, PostgresPool};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Config file used when `FLEETSIM_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "fleetsim-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the database, or the HTTP listener
/// cannot be initialized.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config = config_source,
        tick_interval_ms = config.simulation.tick_interval_ms,
        default_speed_knots = config.simulation.default_speed_knots,
        time_multiplier = config.simulation.time_multiplier,
        "fleetsim-server starting"
    );

    // 3. Connect to PostgreSQL.
    let pg_config = PostgresConfig::new(&config.database.url)
        .with_max_connections(config.database.max_connections)
        .with_connect_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .with_statement_timeout(Duration::from_millis(config.database.statement_timeout_ms));
    let pool = PostgresPool::connect(&pg_config).await?;
    pool.run_migrations().await?;

    // 4. Create the registry.
    let gateway = Arc::new(PgVesselGateway::new(pool.pool().clone()));
    let registry = Arc::new(SimulationRegistry::new(gateway, config.simulation.clone()));

    // 5. Serve until Ctrl-C.
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    let state = Arc::new(AppState::new(Arc::clone(&registry)));
    let served = fleetsim_api::start_server(&server_config, state, shutdown_signal()).await;

    // 6. Tear down, even when serving failed.
    let stopped = registry.stop_all().await;
    info!(stopped, "Simulations stopped");
    pool.close().await;

    served?;
    info!("fleetsim-server stopped");
    Ok(())
}

/// Load configuration from `FLEETSIM_CONFIG` or the default path.
///
/// Falls back to defaults (plus environment overrides) when no file
/// exists. Returns the config and a description of where it came from.
fn load_config() -> Result<(FleetConfig, String), ServerError> {
    let path = std::env::var("FLEETSIM_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = FleetConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((FleetConfig::parse("")?, String::from("defaults")))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Resolves on `Ctrl-C`.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
    info!("Shutdown signal received");
}
