//! Dashboard views built on top of finalized campaigns: the totals strip,
//! per-campaign display strings and the daily spend chart.

use crate::finalize::{FinalizedCampaign, MICROS_PER_UNIT};
use crate::format;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use whatsfloat_core::MetricRow;

/// Account-wide totals across every campaign in a report.
///
/// Unlike the per-campaign rates, these ratios are computed from the summed
/// volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTotals {
    pub campaigns: usize,
    pub impressions: u64,
    pub clicks: u64,
    pub cost_micros: u64,
    pub conversions: f64,
    pub ctr: f64,
    pub cost_formatted: String,
    pub impressions_formatted: String,
    pub ctr_formatted: String,
    pub average_cpc_formatted: String,
    pub cost_per_conversion_formatted: String,
}

impl CampaignTotals {
    pub fn from_campaigns(campaigns: &[FinalizedCampaign]) -> Self {
        let impressions = campaigns.iter().map(|c| c.impressions).fold(0u64, u64::saturating_add);
        let clicks = campaigns.iter().map(|c| c.clicks).fold(0u64, u64::saturating_add);
        let cost_micros = campaigns.iter().map(|c| c.cost_micros).fold(0u64, u64::saturating_add);
        let conversions: f64 = campaigns.iter().map(|c| c.conversions).sum();
        let ctr = if impressions > 0 {
            clicks as f64 / impressions as f64
        } else {
            0.0
        };

        Self {
            campaigns: campaigns.len(),
            impressions,
            clicks,
            cost_micros,
            conversions,
            ctr,
            cost_formatted: format::format_cost(cost_micros),
            impressions_formatted: format::format_impressions(impressions),
            ctr_formatted: format::calculate_ctr(clicks, impressions),
            average_cpc_formatted: format::calculate_avg_cpc(cost_micros, clicks),
            cost_per_conversion_formatted: format::calculate_cost_per_conversion(
                cost_micros,
                conversions,
            ),
        }
    }
}

/// Ready-to-render strings for one campaign row of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayCampaign {
    pub cost: String,
    pub impressions: String,
    pub impressions_compact: String,
    pub clicks: String,
    pub ctr: String,
    pub average_cpc: String,
    pub cost_per_conversion: String,
}

impl From<&FinalizedCampaign> for DisplayCampaign {
    fn from(c: &FinalizedCampaign) -> Self {
        Self {
            cost: format::format_cost(c.cost_micros),
            impressions: format::format_impressions(c.impressions),
            impressions_compact: format::format_large_number(c.impressions),
            clicks: format::format_impressions(c.clicks),
            ctr: format::calculate_ctr(c.clicks, c.impressions),
            average_cpc: format::calculate_avg_cpc(c.cost_micros, c.clicks),
            cost_per_conversion: format::calculate_cost_per_conversion(
                c.cost_micros,
                c.conversions,
            ),
        }
    }
}

/// One day of account activity, summed across campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub cost_micros: u64,
    pub conversions: f64,
    pub cost_formatted: f64,
    pub ctr_percentage: f64,
}

/// Sum date-segmented rows per day, ascending by date. Rows without a date
/// are skipped.
pub fn daily_series(rows: &[MetricRow]) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, (u64, u64, u64, f64)> = BTreeMap::new();
    for row in rows {
        let Some(date) = row.date else { continue };
        let day = days.entry(date).or_default();
        day.0 = day.0.saturating_add(row.impressions);
        day.1 = day.1.saturating_add(row.clicks);
        day.2 = day.2.saturating_add(row.cost_micros);
        day.3 += row.conversions;
    }

    days.into_iter()
        .map(|(date, (impressions, clicks, cost_micros, conversions))| DailyPoint {
            date,
            impressions,
            clicks,
            cost_micros,
            conversions,
            cost_formatted: cost_micros as f64 / MICROS_PER_UNIT,
            ctr_percentage: if impressions > 0 {
                clicks as f64 / impressions as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalize::summarize;

    fn day(id: u64, date: &str, impressions: u64, clicks: u64, cost_micros: u64) -> MetricRow {
        MetricRow {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            impressions,
            clicks,
            cost_micros,
            conversions: 1.0,
            ..MetricRow::new(id, format!("Campaign {id}"))
        }
    }

    #[test]
    fn test_totals_use_summed_volumes() {
        let rows = vec![
            day(1, "2026-03-01", 1000, 10, 5_000_000),
            day(2, "2026-03-01", 3000, 90, 15_000_000),
        ];
        let totals = CampaignTotals::from_campaigns(&summarize(&rows));
        assert_eq!(totals.campaigns, 2);
        assert_eq!(totals.impressions, 4000);
        assert_eq!(totals.clicks, 100);
        assert!((totals.ctr - 0.025).abs() < 1e-12);
        assert_eq!(totals.cost_formatted, "R$ 20,00");
        assert_eq!(totals.impressions_formatted, "4.000");
        assert_eq!(totals.ctr_formatted, "2.50%");
        assert_eq!(totals.average_cpc_formatted, "R$ 0,20");
        assert_eq!(totals.cost_per_conversion_formatted, "R$ 10,00");
    }

    #[test]
    fn test_totals_of_nothing() {
        let totals = CampaignTotals::from_campaigns(&[]);
        assert_eq!(totals.campaigns, 0);
        assert_eq!(totals.ctr, 0.0);
        assert_eq!(totals.ctr_formatted, "0%");
        assert_eq!(totals.average_cpc_formatted, "R$ 0,00");
        assert_eq!(totals.cost_per_conversion_formatted, "R$ 0,00");
    }

    #[test]
    fn test_display_campaign() {
        let rows = vec![day(1, "2026-03-01", 1_500_000, 25, 1_234_567_890)];
        let display = DisplayCampaign::from(&summarize(&rows)[0]);
        assert_eq!(display.cost, "R$ 1.234,57");
        assert_eq!(display.impressions, "1.500.000");
        assert_eq!(display.impressions_compact, "1.5M");
        assert_eq!(display.clicks, "25");
        assert_eq!(display.cost_per_conversion, "R$ 1.234,57");
    }

    #[test]
    fn test_daily_series_sorted_and_summed() {
        let rows = vec![
            day(1, "2026-03-02", 100, 5, 1_000_000),
            day(2, "2026-03-01", 200, 10, 2_000_000),
            day(1, "2026-03-01", 300, 20, 3_000_000),
            MetricRow::new(3u64, "undated"),
        ];
        let points = daily_series(&rows);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date.to_string(), "2026-03-01");
        assert_eq!(points[0].impressions, 500);
        assert_eq!(points[0].clicks, 30);
        assert_eq!(points[0].cost_formatted, 5.0);
        assert!((points[0].conversions - 2.0).abs() < 1e-12);
        assert!((points[0].ctr_percentage - 6.0).abs() < 1e-9);
        assert_eq!(points[1].date.to_string(), "2026-03-02");
    }
}
