pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{WhatsfloatError, WhatsfloatResult};
pub use types::{CampaignId, DateRange, MetricRow, ReportKey};
