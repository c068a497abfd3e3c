//! OpenAPI document for the reporting API, served as JSON.

use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WhatsFloat Ads Reporting API",
        version = "0.1.0",
        description = "Google Ads campaign metrics for the WhatsFloat lead dashboard: per-campaign aggregation, derived KPIs and BRL-formatted display values.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Reports", description = "Campaign and daily Google Ads reports"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Reports
        crate::rest::handle_campaigns,
        crate::rest::handle_daily,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        whatsfloat_core::CampaignId,
        whatsfloat_core::DateRange,
        whatsfloat_reporting::FinalizedCampaign,
        whatsfloat_reporting::DisplayCampaign,
        whatsfloat_reporting::CampaignTotals,
        whatsfloat_reporting::DailyPoint,
        whatsfloat_reporting::Pagination,
        crate::rest::CampaignReport,
        crate::rest::CampaignReportResponse,
        crate::rest::DailyReportResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;

/// GET /openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
