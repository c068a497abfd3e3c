//! Google Ads campaign reporting: turns raw report rows into per-campaign
//! totals, derived KPIs and BRL display strings.
//!
//! Rows flow one way: ingest -> aggregate -> finalize -> format. Every step
//! is a pure function of its input and never fails.

#![warn(clippy::unwrap_used)]

pub mod aggregate;
pub mod finalize;
pub mod format;
pub mod ingest;
pub mod page;
pub mod summary;

pub use aggregate::{aggregate, AggregatedCampaign, RateAccumulator};
pub use finalize::{finalize, summarize, FinalizedCampaign};
pub use ingest::{ingest, ingest_json, RawReportRow};
pub use page::{paginate, Page, Pagination};
pub use summary::{daily_series, CampaignTotals, DailyPoint, DisplayCampaign};
