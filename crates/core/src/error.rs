use thiserror::Error;

pub type WhatsfloatResult<T> = Result<T, WhatsfloatError>;

#[derive(Error, Debug)]
pub enum WhatsfloatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Google Ads upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Report source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WhatsfloatError {
    /// Whether the error was caused by the caller's input rather than by us
    /// or the reporting API.
    pub fn is_client_error(&self) -> bool {
        matches!(self, WhatsfloatError::Validation(_))
    }
}
