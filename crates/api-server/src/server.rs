//! API server — builds the router and runs the HTTP listener.

use crate::rest::{self, AppState, CachedRows};
use crate::source::{FixtureSource, GoogleAdsSource, ReportSource};
use crate::swagger;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use whatsfloat_cache::LocalCache;
use whatsfloat_core::config::AppConfig;
use whatsfloat_core::{ReportKey, WhatsfloatResult};

/// In-process cache of upstream report rows.
pub type RowCache = LocalCache<ReportKey, CachedRows>;

/// Assemble the REST router around an already-built state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Reports
        .route("/v1/google-ads/campaigns", get(rest::handle_campaigns))
        .route("/v1/google-ads/daily", get(rest::handle_daily))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .route("/openapi.json", get(swagger::openapi_json))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pick the report source from configuration: a fixture file when one is
/// configured, the live Google Ads API otherwise.
pub fn source_from_config(config: &AppConfig) -> WhatsfloatResult<Arc<dyn ReportSource>> {
    match &config.google_ads.fixture_path {
        Some(path) => {
            info!(path = %path, "Serving reports from fixture file");
            Ok(Arc::new(FixtureSource::new(path)))
        }
        None => Ok(Arc::new(GoogleAdsSource::new(config.google_ads.clone())?)),
    }
}

/// Main API server.
pub struct ApiServer {
    config: AppConfig,
    source: Arc<dyn ReportSource>,
    cache: Arc<RowCache>,
}

impl ApiServer {
    pub fn new(config: AppConfig, source: Arc<dyn ReportSource>, cache: Arc<RowCache>) -> Self {
        Self {
            config,
            source,
            cache,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            source: self.source.clone(),
            cache: self.cache.clone(),
            cache_ttl: self.cache.default_ttl(),
            default_page_size: self.config.api.default_page_size,
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = build_router(self.state());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
