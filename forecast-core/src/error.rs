use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single provider attempt failed in a way worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    /// HTTP status returned by the provider, `None` for transport errors.
    pub status: Option<StatusCode>,
    /// Short description for logs.
    pub reason: String,
    /// Human-readable message taken from the provider's error body, if it sent one.
    pub upstream_message: Option<String>,
}

impl UpstreamFailure {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self { status: None, reason: reason.into(), upstream_message: None }
    }

    pub fn status(status: StatusCode, upstream_message: Option<String>) -> Self {
        Self {
            status: Some(status),
            reason: format!("provider responded with {status}"),
            upstream_message,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

impl std::fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.upstream_message {
            Some(msg) => write!(f, "{} ({msg})", self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Missing required parameter(s): {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("Invalid '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Weather API key is not configured")]
    MissingCredential,

    #[error("Failed to fetch forecast after {attempts} attempts: {failure}")]
    UpstreamExhausted { attempts: u32, failure: UpstreamFailure },

    #[error("Unexpected response shape from weather provider: {0}")]
    MalformedResponse(String),

    #[error("No forecast available for {0}")]
    NoForecastForDate(String),

    #[error("Forecast request did not complete within {0:?}")]
    DeadlineExceeded(Duration),
}
