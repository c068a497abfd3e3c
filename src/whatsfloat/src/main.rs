//! WhatsFloat ads reporting service — Google Ads campaign metrics for the
//! lead dashboard.
//!
//! Main entry point that loads configuration, wires the report cache and
//! source, and starts the server.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use whatsfloat_api::{source_from_config, ApiServer, RowCache};
use whatsfloat_core::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "whatsfloat")]
#[command(about = "Google Ads campaign reporting API for the WhatsFloat dashboard")]
#[command(version)]
struct Cli {
    /// Bind address (overrides config)
    #[arg(long, env = "WHATSFLOAT__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "WHATSFLOAT__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Serve reports from a JSON fixture instead of Google Ads
    #[arg(long, env = "WHATSFLOAT__GOOGLE_ADS__FIXTURE_PATH")]
    fixture: Option<String>,

    /// Report cache TTL in seconds (overrides config)
    #[arg(long, env = "WHATSFLOAT__CACHE__TTL_SECS")]
    cache_ttl_secs: Option<u64>,

    /// Do not start the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whatsfloat=info,whatsfloat_api=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("WhatsFloat reporting starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(path) = cli.fixture {
        config.google_ads.fixture_path = Some(path);
    }
    if let Some(ttl) = cli.cache_ttl_secs {
        config.cache.ttl_secs = ttl;
    }
    if cli.no_metrics {
        config.metrics.enabled = false;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        cache_ttl_secs = config.cache.ttl_secs,
        fixture = config.google_ads.fixture_path.is_some(),
        "Configuration loaded"
    );

    let source = source_from_config(&config)?;
    let cache = Arc::new(RowCache::new(
        config.cache.ttl_secs,
        config.cache.max_entries,
    ));

    let api_server = ApiServer::new(config.clone(), source, cache.clone());

    // Start metrics exporter
    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics().await {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    // Spawn cache maintenance task
    let interval_secs = config.cache.maintenance_interval_secs.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            let evicted = cache.evict_expired();
            if evicted > 0 {
                debug!(evicted = evicted, size = cache.len(), "Report cache eviction complete");
            }
        }
    });

    info!("WhatsFloat reporting is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
