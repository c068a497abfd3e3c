#![warn(clippy::unwrap_used)]

pub mod rest;
pub mod server;
pub mod source;
pub mod swagger;

pub use rest::AppState;
pub use server::{build_router, source_from_config, ApiServer, RowCache};
pub use source::{FixtureSource, GoogleAdsSource, ReportSource};
pub use swagger::ApiDoc;
