//! REST API handlers for campaign reports and operational endpoints.

use crate::source::ReportSource;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use utoipa::{IntoParams, ToSchema};
use whatsfloat_cache::ReportCache;
use whatsfloat_core::{DateRange, MetricRow, ReportKey, WhatsfloatError, WhatsfloatResult};
use whatsfloat_reporting::{
    daily_series, paginate, summarize, CampaignTotals, DailyPoint, DisplayCampaign,
    FinalizedCampaign, Pagination,
};

/// Cached upstream rows for one report query.
pub type CachedRows = Arc<Vec<MetricRow>>;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ReportSource>,
    pub cache: Arc<dyn ReportCache<ReportKey, CachedRows>>,
    pub cache_ttl: Duration,
    pub default_page_size: usize,
    pub node_id: String,
    pub start_time: Instant,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Google Ads customer ID, with or without dashes.
    pub customer_id: Option<String>,
    /// First day of the report, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Last day of the report (inclusive), `YYYY-MM-DD`.
    pub date_to: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl ReportQuery {
    fn report_key(&self) -> WhatsfloatResult<ReportKey> {
        let customer_id = required("customer_id", &self.customer_id)?;
        let from = required("date_from", &self.date_from)?;
        let to = required("date_to", &self.date_to)?;
        ReportKey::new(customer_id, DateRange::parse(from, to)?)
    }
}

fn required<'a>(name: &str, value: &'a Option<String>) -> WhatsfloatResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WhatsfloatError::Validation(format!("{name} is required"))),
    }
}

/// Fetch rows through the cache. Returns the rows and whether they came
/// from the cache.
async fn load_rows(state: &AppState, key: &ReportKey) -> WhatsfloatResult<(CachedRows, bool)> {
    if let Some(rows) = state.cache.get(key) {
        debug!(key = %key, rows = rows.len(), "Report cache hit");
        return Ok((rows, true));
    }

    debug!(key = %key, days = key.range.days(), "Report cache miss, querying source");
    let rows: CachedRows = Arc::new(state.source.fetch(key).await?);
    state.cache.set(key.clone(), rows.clone(), state.cache_ttl);
    Ok((rows, false))
}

/// GET /v1/google-ads/campaigns — Per-campaign report for a date range.
#[utoipa::path(
    get,
    path = "/v1/google-ads/campaigns",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Aggregated campaigns", body = CampaignReportResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 502, description = "Google Ads query failed", body = ErrorResponse),
    )
)]
pub async fn handle_campaigns(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<CampaignReportResponse>, ApiError> {
    let key = query.report_key()?;
    let (rows, cached) = load_rows(&state, &key).await?;

    let campaigns = summarize(&rows);
    let totals = CampaignTotals::from_campaigns(&campaigns);
    let page = paginate(
        campaigns,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(state.default_page_size),
    );

    Ok(Json(CampaignReportResponse {
        customer_id: key.customer_id,
        range: key.range,
        campaigns: page
            .items
            .into_iter()
            .map(|campaign| CampaignReport {
                display: DisplayCampaign::from(&campaign),
                campaign,
            })
            .collect(),
        totals,
        pagination: page.pagination,
        cached,
    }))
}

/// GET /v1/google-ads/daily — Account totals per day for a date range.
#[utoipa::path(
    get,
    path = "/v1/google-ads/daily",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Daily series", body = DailyReportResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 502, description = "Google Ads query failed", body = ErrorResponse),
    )
)]
pub async fn handle_daily(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<DailyReportResponse>, ApiError> {
    let key = query.report_key()?;
    let (rows, cached) = load_rows(&state, &key).await?;

    Ok(Json(DailyReportResponse {
        customer_id: key.customer_id,
        range: key.range,
        points: daily_series(&rows),
        cached,
    }))
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to serve"))
)]
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReport {
    #[serde(flatten)]
    pub campaign: FinalizedCampaign,
    pub display: DisplayCampaign,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReportResponse {
    pub customer_id: String,
    pub range: DateRange,
    pub campaigns: Vec<CampaignReport>,
    pub totals: CampaignTotals,
    pub pagination: Pagination,
    pub cached: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportResponse {
    pub customer_id: String,
    pub range: DateRange,
    pub points: Vec<DailyPoint>,
    pub cached: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

/// Handler error mapped onto an HTTP status and an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError(pub WhatsfloatError);

impl From<WhatsfloatError> for ApiError {
    fn from(err: WhatsfloatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self.0 {
            WhatsfloatError::Validation(msg) => {
                warn!(error = %msg, "Report request validation failed");
                metrics::counter!("api.validation_errors").increment(1);
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            WhatsfloatError::Upstream { .. } | WhatsfloatError::Source(_) => {
                error!(error = %self.0, "Google Ads query failed");
                metrics::counter!("api.upstream_errors").increment(1);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_failed",
                    "Failed to query Google Ads".to_string(),
                )
            }
            other => {
                error!(error = %other, "Report request failed");
                metrics::counter!("api.errors").increment(1);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal processing error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
