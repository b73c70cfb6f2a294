//! Error types for ghdeploy

use thiserror::Error;

/// Main error type for ghdeploy
#[derive(Error, Debug)]
pub enum GhdeployError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git error: {0}")]
    Git(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GhdeployError {
    /// Whether this error is a transient transport failure rather than a
    /// remote verdict. Poll ticks tolerate these, and enrichment fetches
    /// degrade the affected record instead of failing the listing.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GhdeployError::Http(_) | GhdeployError::RateLimited(_)
        )
    }
}
