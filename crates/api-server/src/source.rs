//! Where report rows come from: the Google Ads REST API, or a JSON fixture
//! for local development.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use whatsfloat_core::config::GoogleAdsConfig;
use whatsfloat_core::{MetricRow, ReportKey, WhatsfloatError, WhatsfloatResult};
use whatsfloat_reporting::ingest_json;

/// Guard against an upstream that keeps handing out page tokens.
const MAX_PAGES: usize = 200;

/// Fetches date-segmented campaign rows for one customer and date range.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch(&self, key: &ReportKey) -> WhatsfloatResult<Vec<MetricRow>>;
}

/// GAQL for one row per campaign per day.
pub fn campaign_query(key: &ReportKey) -> String {
    format!(
        "SELECT campaign.id, campaign.name, segments.date, \
         metrics.impressions, metrics.clicks, metrics.cost_micros, metrics.conversions, \
         metrics.average_cpc, metrics.ctr, metrics.average_cpm, \
         metrics.conversions_from_interactions_rate \
         FROM campaign \
         WHERE segments.date BETWEEN '{}' AND '{}' \
         AND campaign.status != 'REMOVED' \
         ORDER BY campaign.id",
        key.range.from.format("%Y-%m-%d"),
        key.range.to.format("%Y-%m-%d"),
    )
}

/// Client for `customers/{id}/googleAds:search`.
pub struct GoogleAdsSource {
    client: reqwest::Client,
    config: GoogleAdsConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl GoogleAdsSource {
    pub fn new(config: GoogleAdsConfig) -> WhatsfloatResult<Self> {
        if config.developer_token.is_empty() {
            return Err(WhatsfloatError::Config(
                "google_ads.developer_token is required".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| WhatsfloatError::Config(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn search_url(&self, customer_id: &str) -> String {
        format!(
            "{}/{}/customers/{}/googleAds:search",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            customer_id
        )
    }

    async fn search_page(
        &self,
        url: &str,
        query: &str,
        page_token: Option<&str>,
    ) -> WhatsfloatResult<SearchPage> {
        let mut body = serde_json::json!({ "query": query });
        if let Some(token) = page_token {
            body["pageToken"] = Value::String(token.to_string());
        }

        let mut request = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .header("developer-token", &self.config.developer_token)
            .json(&body);
        if let Some(login) = self.config.login_customer_id.as_deref() {
            request = request.header("login-customer-id", login.replace('-', ""));
        }

        let response = request
            .send()
            .await
            .map_err(|e| WhatsfloatError::Source(format!("Google Ads request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WhatsfloatError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<SearchPage>()
            .await
            .map_err(|e| WhatsfloatError::Source(format!("Google Ads response: {e}")))
    }
}

#[async_trait]
impl ReportSource for GoogleAdsSource {
    async fn fetch(&self, key: &ReportKey) -> WhatsfloatResult<Vec<MetricRow>> {
        let start = Instant::now();
        let url = self.search_url(&key.customer_id);
        let query = campaign_query(key);

        let mut results: Vec<Value> = Vec::new();
        let mut page_token: Option<String> = None;
        for page in 0..MAX_PAGES {
            let batch = self.search_page(&url, &query, page_token.as_deref()).await?;
            debug!(page = page, rows = batch.results.len(), "Fetched Google Ads page");
            results.extend(batch.results);
            match batch.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => {
                    page_token = None;
                    break;
                }
            }
        }
        if page_token.is_some() {
            warn!(customer_id = %key.customer_id, "Stopped paging Google Ads results at page limit");
        }

        let rows = ingest_json(&Value::Array(results));
        info!(
            customer_id = %key.customer_id,
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Google Ads report fetched"
        );
        Ok(rows)
    }
}

/// Serves rows from a JSON file holding either an array of rows or a
/// `{"results": [...]}` object. Dated rows outside the requested range are
/// left out; the customer ID is ignored.
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReportSource for FixtureSource {
    async fn fetch(&self, key: &ReportKey) -> WhatsfloatResult<Vec<MetricRow>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let payload: Value = serde_json::from_str(&raw)?;
        let rows = ingest_json(&payload)
            .into_iter()
            .filter(|row| {
                row.date
                    .map_or(true, |d| d >= key.range.from && d <= key.range.to)
            })
            .collect::<Vec<_>>();
        debug!(path = %self.path.display(), rows = rows.len(), "Loaded fixture report");
        Ok(rows)
    }
}
