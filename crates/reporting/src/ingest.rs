//! Typed ingestion of upstream report rows.
//!
//! Accepts both the snake_case shape produced by the Google Ads client
//! libraries and the camelCase shape of the REST API. Numbers may arrive as
//! JSON numbers or as strings (the REST API encodes int64 as strings); any
//! missing, null, negative or unparsable value becomes `0`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;
use whatsfloat_core::{CampaignId, MetricRow};

/// One result row as returned by a date-segmented campaign query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReportRow {
    pub campaign: Option<RawCampaign>,
    pub metrics: Option<RawMetrics>,
    pub segments: Option<RawSegments>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCampaign {
    pub id: Value,
    pub name: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMetrics {
    #[serde(deserialize_with = "lenient_u64")]
    pub impressions: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub clicks: u64,
    #[serde(alias = "costMicros", deserialize_with = "lenient_u64")]
    pub cost_micros: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub conversions: f64,
    #[serde(alias = "averageCpc", deserialize_with = "lenient_f64")]
    pub average_cpc: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub ctr: f64,
    #[serde(alias = "averageCpm", deserialize_with = "lenient_f64")]
    pub average_cpm: f64,
    #[serde(
        alias = "conversionsFromInteractionsRate",
        deserialize_with = "lenient_f64"
    )]
    pub conversions_from_interactions_rate: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSegments {
    pub date: Value,
}

impl RawReportRow {
    /// Convert into a [`MetricRow`]. Rows without a campaign ID cannot be
    /// grouped and yield `None`.
    pub fn into_metric_row(self) -> Option<MetricRow> {
        let campaign = self.campaign.unwrap_or_default();
        let campaign_id = campaign_id(&campaign.id)?;
        let campaign_name = match campaign.name {
            Value::String(name) => name,
            _ => String::new(),
        };
        let metrics = self.metrics.unwrap_or_default();
        let date = self.segments.and_then(|s| match s.date {
            Value::String(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok(),
            _ => None,
        });

        Some(MetricRow {
            campaign_id,
            campaign_name,
            date,
            impressions: metrics.impressions,
            clicks: metrics.clicks,
            cost_micros: metrics.cost_micros,
            conversions: metrics.conversions,
            average_cpc: metrics.average_cpc,
            ctr: metrics.ctr,
            average_cpm: metrics.average_cpm,
            conversion_rate: metrics.conversions_from_interactions_rate,
        })
    }
}

/// Convert typed raw rows, dropping the ones that carry no campaign ID.
pub fn ingest(raw: Vec<RawReportRow>) -> Vec<MetricRow> {
    let total = raw.len();
    let rows: Vec<MetricRow> = raw
        .into_iter()
        .filter_map(RawReportRow::into_metric_row)
        .collect();
    if rows.len() < total {
        warn!(
            dropped = total - rows.len(),
            total = total,
            "Dropped report rows without a campaign id"
        );
    }
    rows
}

/// Ingest an untyped payload: either an array of rows or an object holding
/// a `results` array. Any other shape yields no rows.
pub fn ingest_json(payload: &Value) -> Vec<MetricRow> {
    let items = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let mut raw = Vec::with_capacity(items.len());
    for item in items {
        match RawReportRow::deserialize(item) {
            Ok(row) => raw.push(row),
            Err(e) => warn!(error = %e, "Skipping report row with unexpected shape"),
        }
    }
    ingest(raw)
}

fn campaign_id(value: &Value) -> Option<CampaignId> {
    match value {
        Value::Number(n) => Some(CampaignId(n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(CampaignId(s.trim().to_string())),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

fn coerce_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| coerce_f64(value) as u64),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .unwrap_or_else(|_| coerce_f64(value) as u64),
        _ => 0,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| coerce_f64(&v))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| coerce_u64(&v))
}
