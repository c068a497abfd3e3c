use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use whatsfloat_api::rest::CachedRows;
use whatsfloat_api::{build_router, AppState, ReportSource};
use whatsfloat_cache::{LocalCache, ManualClock};
use whatsfloat_core::{MetricRow, ReportKey, WhatsfloatError, WhatsfloatResult};
use whatsfloat_reporting::ingest_json;

/// Serves a fixed payload and counts upstream calls.
struct CountingSource {
    payload: Value,
    calls: AtomicUsize,
}

#[async_trait]
impl ReportSource for CountingSource {
    async fn fetch(&self, _key: &ReportKey) -> WhatsfloatResult<Vec<MetricRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ingest_json(&self.payload))
    }
}

struct FailingSource;

#[async_trait]
impl ReportSource for FailingSource {
    async fn fetch(&self, _key: &ReportKey) -> WhatsfloatResult<Vec<MetricRow>> {
        Err(WhatsfloatError::Upstream {
            status: 403,
            message: "PERMISSION_DENIED".to_string(),
        })
    }
}

fn payload() -> Value {
    json!({ "results": [
        {
            "campaign": { "id": "1", "name": "Leads SP" },
            "segments": { "date": "2026-03-01" },
            "metrics": {
                "impressions": "1000", "clicks": "50", "costMicros": "5000000",
                "conversions": 2.0, "averageCpc": 100000.0, "ctr": 0.05
            }
        },
        {
            "campaign": { "id": "2", "name": "Remarketing" },
            "segments": { "date": "2026-03-01" },
            "metrics": { "impressions": "400", "clicks": "4", "costMicros": "0" }
        },
        {
            "campaign": { "id": "1", "name": "Leads SP" },
            "segments": { "date": "2026-03-02" },
            "metrics": {
                "impressions": "2000", "clicks": "100", "costMicros": "10000000",
                "conversions": 3.0, "averageCpc": 100000.0, "ctr": 0.05
            }
        }
    ]})
}

type TestCache = LocalCache<ReportKey, CachedRows, ManualClock>;

fn setup_with(source: Arc<dyn ReportSource>) -> (axum::Router, ManualClock, Arc<TestCache>) {
    let clock = ManualClock::new();
    let cache: Arc<TestCache> = Arc::new(LocalCache::with_clock(
        Duration::from_secs(300),
        100,
        clock.clone(),
    ));
    let state = AppState {
        source,
        cache: cache.clone(),
        cache_ttl: Duration::from_secs(300),
        default_page_size: 20,
        node_id: "test-node".to_string(),
        start_time: Instant::now(),
    };
    (build_router(state), clock, cache)
}

fn counting() -> Arc<CountingSource> {
    Arc::new(CountingSource {
        payload: payload(),
        calls: AtomicUsize::new(0),
    })
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = res
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, serde_json::from_slice(&bytes).expect("parse JSON"))
}

const CAMPAIGNS: &str =
    "/v1/google-ads/campaigns?customer_id=123-456-7890&date_from=2026-03-01&date_to=2026-03-31";

#[tokio::test]
async fn campaigns_are_aggregated_and_formatted() {
    let source = counting();
    let (app, _clock, _cache) = setup_with(source.clone());

    let (status, body) = get(&app, CAMPAIGNS).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customerId"], "1234567890");
    assert_eq!(body["cached"], false);

    let campaigns = body["campaigns"].as_array().expect("campaigns");
    assert_eq!(campaigns.len(), 2);

    let first = &campaigns[0];
    assert_eq!(first["campaignId"], "1");
    assert_eq!(first["impressions"], 3000);
    assert_eq!(first["clicks"], 150);
    assert_eq!(first["costMicros"], 15_000_000);
    assert_eq!(first["costFormatted"], 15.0);
    assert_eq!(first["ctrPercentage"], 5.0);
    let roi = first["roi"].as_f64().expect("roi");
    assert!((roi - 500.0 / 15.0).abs() < 1e-9);
    assert_eq!(first["display"]["cost"], "R$ 15,00");
    assert_eq!(first["display"]["impressions"], "3.000");
    assert_eq!(first["display"]["ctr"], "5.00%");

    let second = &campaigns[1];
    assert_eq!(second["campaignId"], "2");
    assert_eq!(second["roi"], 0.0);
    assert_eq!(second["display"]["averageCpc"], "R$ 0,00");
    assert_eq!(second["display"]["costPerConversion"], "R$ 0,00");

    assert_eq!(body["totals"]["campaigns"], 2);
    assert_eq!(body["totals"]["impressions"], 3400);
    assert_eq!(body["totals"]["costFormatted"], "R$ 15,00");
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_request_is_served_from_cache_until_expiry() {
    let source = counting();
    let (app, clock, cache) = setup_with(source.clone());

    let (_, first) = get(&app, CAMPAIGNS).await;
    assert_eq!(first["cached"], false);

    // Same customer in another notation maps to the same key.
    let (_, second) = get(
        &app,
        "/v1/google-ads/daily?customer_id=1234567890&date_from=2026-03-01&date_to=2026-03-31",
    )
    .await;
    assert_eq!(second["cached"], true);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);

    clock.advance(Duration::from_secs(301));
    let (_, third) = get(&app, CAMPAIGNS).await;
    assert_eq!(third["cached"], false);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn different_date_range_is_a_different_cache_key() {
    let source = counting();
    let (app, _clock, _cache) = setup_with(source.clone());

    get(&app, CAMPAIGNS).await;
    let (_, body) = get(
        &app,
        "/v1/google-ads/campaigns?customer_id=1234567890&date_from=2026-03-01&date_to=2026-03-30",
    )
    .await;
    assert_eq!(body["cached"], false);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn daily_series_sums_campaigns_per_day() {
    let (app, _clock, _cache) = setup_with(counting());

    let (status, body) = get(
        &app,
        "/v1/google-ads/daily?customer_id=1234567890&date_from=2026-03-01&date_to=2026-03-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let points = body["points"].as_array().expect("points");
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["date"], "2026-03-01");
    assert_eq!(points[0]["impressions"], 1400);
    assert_eq!(points[0]["clicks"], 54);
    assert_eq!(points[1]["date"], "2026-03-02");
    assert_eq!(points[1]["costFormatted"], 10.0);
}

#[tokio::test]
async fn pagination_slices_campaigns_but_not_totals() {
    let (app, _clock, _cache) = setup_with(counting());

    let (_, body) = get(&app, &format!("{CAMPAIGNS}&page=2&limit=1")).await;
    let campaigns = body["campaigns"].as_array().expect("campaigns");
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["campaignId"], "2");
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["totals"]["campaigns"], 2);
}

#[tokio::test]
async fn invalid_queries_are_rejected() {
    let source = counting();
    let (app, _clock, _cache) = setup_with(source.clone());

    for uri in [
        "/v1/google-ads/campaigns?date_from=2026-03-01&date_to=2026-03-31",
        "/v1/google-ads/campaigns?customer_id=12345&date_from=2026-03-01&date_to=2026-03-31",
        "/v1/google-ads/campaigns?customer_id=1234567890&date_from=2026-03-31&date_to=2026-03-01",
        "/v1/google-ads/campaigns?customer_id=1234567890&date_from=March&date_to=2026-03-31",
        "/v1/google-ads/daily?customer_id=1234567890&date_from=2026-03-01",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "invalid_request");
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway_and_is_not_cached() {
    let (app, _clock, cache) = setup_with(Arc::new(FailingSource));

    let (status, body) = get(&app, CAMPAIGNS).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_failed");
    assert!(cache.is_empty());
}

#[tokio::test]
async fn empty_report_has_zero_totals() {
    let source = Arc::new(CountingSource {
        payload: json!({ "results": [] }),
        calls: AtomicUsize::new(0),
    });
    let (app, _clock, _cache) = setup_with(source);

    let (status, body) = get(&app, CAMPAIGNS).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["campaigns"].as_array().expect("campaigns").is_empty());
    assert_eq!(body["totals"]["ctrFormatted"], "0%");
    assert_eq!(body["pagination"]["totalPages"], 0);
}

#[tokio::test]
async fn health_and_openapi() {
    let (app, _clock, _cache) = setup_with(counting());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["node_id"], "test-node");

    let (status, body) = get(&app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/google-ads/campaigns"].is_object());
}

#[tokio::test]
async fn server_state_uses_cache_default_ttl() {
    let config = whatsfloat_core::AppConfig::default();
    let cache = Arc::new(whatsfloat_api::RowCache::new(120, 10));
    let server = whatsfloat_api::ApiServer::new(config, counting(), cache);

    assert_eq!(server.state().cache_ttl, Duration::from_secs(120));
}
