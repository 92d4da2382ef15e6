//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Missing API keys are not startup errors; routes report them instead
//! - The listener binds last (traffic only when ready)

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::backend::key_preview;
use crate::config::{self, AppConfig, ConfigError};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load configuration, install logging and metrics, and bind the listener.
pub async fn bootstrap(config_path: Option<&Path>) -> Result<(AppConfig, TcpListener), StartupError> {
    let config = config::load(config_path)?;
    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        "genedit starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        backend = %config.backend.base_url,
        api_key = %key_preview(config.backend.api_key.as_deref()),
        completion_configured = config.completion.api_key.is_some(),
        "Configuration loaded"
    );
    if config.backend.api_key.is_none() {
        tracing::warn!("FAL_KEY not set; generation routes will answer 401 until configured");
    }

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    Ok((config, listener))
}

/// Serve until SIGINT or SIGTERM, then drain in-flight requests.
pub async fn run(config: AppConfig, listener: TcpListener) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let signal_task = signals::spawn_signal_handler(shutdown.clone());

    let result = HttpServer::new(config).run(listener, receiver).await;
    signal_task.abort();
    result.map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
