//! Derived campaign KPIs computed once all rows have been folded in.

use crate::aggregate::{aggregate, AggregatedCampaign};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use whatsfloat_core::{CampaignId, MetricRow};

pub const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Final per-campaign record returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedCampaign {
    #[schema(value_type = String)]
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub impressions: u64,
    pub clicks: u64,
    pub cost_micros: u64,
    pub conversions: f64,
    /// Mean of per-row average CPC, in micros.
    pub average_cpc: f64,
    /// Mean of per-row CTR, as a ratio.
    pub ctr: f64,
    /// Mean of per-row average CPM, in micros.
    pub average_cpm: f64,
    pub conversion_rate: f64,
    /// Cost in currency units (BRL).
    pub cost_formatted: f64,
    pub ctr_percentage: f64,
    pub cpm_formatted: f64,
    /// Conversions per 100 currency units spent. Kept under the dashboard's
    /// historical name; it is not a return on investment.
    pub roi: f64,
}

/// Compute the averaged rates and the derived fields of one campaign.
/// Every division is guarded and yields `0` on a zero denominator.
pub fn finalize(aggregated: &AggregatedCampaign) -> FinalizedCampaign {
    let average_cpc = aggregated.average_cpc.mean();
    let ctr = aggregated.ctr.mean();
    let average_cpm = aggregated.average_cpm.mean();
    let conversion_rate = aggregated.conversion_rate.mean();

    let cost_formatted = aggregated.cost_micros as f64 / MICROS_PER_UNIT;
    // Zero cost with conversions would otherwise divide by zero.
    let roi = if aggregated.conversions > 0.0 && cost_formatted > 0.0 {
        (aggregated.conversions * 100.0) / cost_formatted
    } else {
        0.0
    };

    FinalizedCampaign {
        campaign_id: aggregated.campaign_id.clone(),
        campaign_name: aggregated.campaign_name.clone(),
        impressions: aggregated.impressions,
        clicks: aggregated.clicks,
        cost_micros: aggregated.cost_micros,
        conversions: aggregated.conversions,
        average_cpc,
        ctr,
        average_cpm,
        conversion_rate,
        cost_formatted,
        ctr_percentage: ctr * 100.0,
        cpm_formatted: average_cpm / 1000.0,
        roi,
    }
}

impl AggregatedCampaign {
    pub fn finalize(&self) -> FinalizedCampaign {
        finalize(self)
    }
}

/// Aggregate and finalize in one pass, preserving first-occurrence order.
pub fn summarize(rows: &[MetricRow]) -> Vec<FinalizedCampaign> {
    aggregate(rows).iter().map(finalize).collect()
}
