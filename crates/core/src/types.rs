use crate::error::{WhatsfloatError, WhatsfloatResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Longest reporting window a single request may ask for.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Length of a Google Ads customer ID once dashes are stripped.
const CUSTOMER_ID_LEN: usize = 10;

/// Opaque campaign identifier. Upstream sends either an integer or a string;
/// both are normalised to their decimal/text form.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct CampaignId(pub String);

impl CampaignId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for CampaignId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for CampaignId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One report row for a campaign, either for a single day (date-segmented
/// queries) or for the whole queried window.
///
/// All numeric fields are already defaulted and non-negative; the ingestion
/// step is responsible for coercing missing or malformed upstream values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricRow {
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub date: Option<NaiveDate>,
    pub impressions: u64,
    pub clicks: u64,
    pub cost_micros: u64,
    pub conversions: f64,
    pub average_cpc: f64,
    pub ctr: f64,
    pub average_cpm: f64,
    pub conversion_rate: f64,
}

impl MetricRow {
    pub fn new(campaign_id: impl Into<CampaignId>, campaign_name: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            campaign_name: campaign_name.into(),
            ..Default::default()
        }
    }
}

/// Inclusive calendar date range of a report query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> WhatsfloatResult<Self> {
        if from > to {
            return Err(WhatsfloatError::Validation(format!(
                "date_from {from} is after date_to {to}"
            )));
        }
        if (to - from).num_days() >= MAX_RANGE_DAYS {
            return Err(WhatsfloatError::Validation(format!(
                "date range exceeds {MAX_RANGE_DAYS} days"
            )));
        }
        Ok(Self { from, to })
    }

    /// Parse a `YYYY-MM-DD` pair.
    pub fn parse(from: &str, to: &str) -> WhatsfloatResult<Self> {
        Self::new(parse_date("date_from", from)?, parse_date("date_to", to)?)
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

fn parse_date(field: &str, raw: &str) -> WhatsfloatResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        WhatsfloatError::Validation(format!("{field} must be a YYYY-MM-DD date, got '{raw}'"))
    })
}

/// Cache key of one upstream report query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub customer_id: String,
    pub range: DateRange,
}

impl ReportKey {
    /// Build a key from a raw customer ID such as `123-456-7890`.
    pub fn new(customer_id: &str, range: DateRange) -> WhatsfloatResult<Self> {
        Ok(Self {
            customer_id: normalize_customer_id(customer_id)?,
            range,
        })
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.customer_id, self.range.from, self.range.to)
    }
}

/// Strip dashes and check the ID is exactly ten digits.
pub fn normalize_customer_id(raw: &str) -> WhatsfloatResult<String> {
    let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if digits.len() != CUSTOMER_ID_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(WhatsfloatError::Validation(format!(
            "customer_id must contain exactly {CUSTOMER_ID_LEN} digits, got '{raw}'"
        )));
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_id_normalization() {
        assert_eq!(normalize_customer_id("123-456-7890").unwrap(), "1234567890");
        assert_eq!(normalize_customer_id(" 1234567890 ").unwrap(), "1234567890");
        assert!(normalize_customer_id("123-456-789").is_err());
        assert!(normalize_customer_id("12345678ab").is_err());
        assert!(normalize_customer_id("").is_err());
    }

    #[test]
    fn test_date_range_validation() {
        let range = DateRange::parse("2026-01-01", "2026-01-31").unwrap();
        assert_eq!(range.days(), 31);

        let single = DateRange::parse("2026-03-05", "2026-03-05").unwrap();
        assert_eq!(single.days(), 1);

        assert!(DateRange::parse("2026-02-01", "2026-01-01").is_err());
        assert!(DateRange::parse("2026-13-01", "2026-12-31").is_err());
        assert!(DateRange::parse("01/01/2026", "2026-01-02").is_err());
        assert!(DateRange::parse("2024-01-01", "2025-06-01").is_err());
    }

    #[test]
    fn test_report_key_display() {
        let range = DateRange::parse("2026-01-01", "2026-01-07").unwrap();
        let key = ReportKey::new("123-456-7890", range).unwrap();
        assert_eq!(key.to_string(), "1234567890:2026-01-01:2026-01-07");
    }

    #[test]
    fn test_validation_errors_are_client_errors() {
        let err = DateRange::parse("bad", "2026-01-01").unwrap_err();
        assert!(err.is_client_error());
        let upstream = WhatsfloatError::Upstream {
            status: 500,
            message: "boom".into(),
        };
        assert!(!upstream.is_client_error());
    }
}
