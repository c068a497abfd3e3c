//! Per-campaign aggregation of report rows.

use std::collections::HashMap;
use whatsfloat_core::{CampaignId, MetricRow};

/// Running `(sum, count)` of a per-row rate metric.
///
/// The mean is unweighted: a day with ten impressions counts as much as a
/// day with ten thousand.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateAccumulator {
    pub sum: f64,
    pub count: u32,
}

impl RateAccumulator {
    fn seeded(value: f64) -> Self {
        Self {
            sum: value,
            count: 1,
        }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Arithmetic mean of the accumulated values, `0` when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Totals for one campaign across all of its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCampaign {
    pub campaign_id: CampaignId,
    /// Name from the first row seen for the campaign.
    pub campaign_name: String,
    pub impressions: u64,
    pub clicks: u64,
    pub cost_micros: u64,
    pub conversions: f64,
    pub average_cpc: RateAccumulator,
    pub ctr: RateAccumulator,
    pub average_cpm: RateAccumulator,
    pub conversion_rate: RateAccumulator,
    /// Number of rows folded into this campaign.
    pub rows: u32,
}

impl AggregatedCampaign {
    fn from_row(row: &MetricRow) -> Self {
        Self {
            campaign_id: row.campaign_id.clone(),
            campaign_name: row.campaign_name.clone(),
            impressions: row.impressions,
            clicks: row.clicks,
            cost_micros: row.cost_micros,
            conversions: row.conversions,
            average_cpc: RateAccumulator::seeded(row.average_cpc),
            ctr: RateAccumulator::seeded(row.ctr),
            average_cpm: RateAccumulator::seeded(row.average_cpm),
            conversion_rate: RateAccumulator::seeded(row.conversion_rate),
            rows: 1,
        }
    }

    fn absorb(&mut self, row: &MetricRow) {
        self.impressions = self.impressions.saturating_add(row.impressions);
        self.clicks = self.clicks.saturating_add(row.clicks);
        self.cost_micros = self.cost_micros.saturating_add(row.cost_micros);
        self.conversions += row.conversions;
        self.average_cpc.add(row.average_cpc);
        self.ctr.add(row.ctr);
        self.average_cpm.add(row.average_cpm);
        self.conversion_rate.add(row.conversion_rate);
        self.rows += 1;
    }
}

/// Group rows by campaign ID.
///
/// Output order is the order in which each campaign first appears in
/// `rows`. Campaigns with no rows never appear.
pub fn aggregate(rows: &[MetricRow]) -> Vec<AggregatedCampaign> {
    let mut index: HashMap<&CampaignId, usize> = HashMap::new();
    let mut campaigns: Vec<AggregatedCampaign> = Vec::new();

    for row in rows {
        match index.get(&row.campaign_id) {
            Some(&i) => campaigns[i].absorb(row),
            None => {
                index.insert(&row.campaign_id, campaigns.len());
                campaigns.push(AggregatedCampaign::from_row(row));
            }
        }
    }

    campaigns
}
