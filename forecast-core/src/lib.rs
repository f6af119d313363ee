//! Core library for the tee-time forecast proxy.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The WeatherAPI.com provider and its retry policy
//! - Date/time parsing and normalization of provider forecasts
//!
//! It is used by `forecast-proxy`, but can also be reused by other binaries or services.

pub mod clock;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod retry;
pub mod service;

pub use config::{Config, ProviderConfig, ServerConfig};
pub use error::{ForecastError, UpstreamFailure};
pub use model::{ForecastQuery, ForecastRequest, NormalizedForecast, ProviderForecast};
pub use provider::{ForecastProvider, WeatherApiProvider};
pub use retry::{Attempt, RetryPolicy};
pub use service::ForecastService;
