use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{config::ProviderConfig, model::ProviderForecast, retry::Attempt};

pub mod weatherapi;

pub use weatherapi::WeatherApiProvider;

/// A weather data source queried once per attempt.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetch the forecast covering `date` (`YYYY-MM-DD`) for `location`.
    ///
    /// Implementations classify their own failures; retrying is left to the caller.
    async fn fetch_day(
        &self,
        api_key: &str,
        location: &str,
        date: &str,
    ) -> Attempt<ProviderForecast>;
}

/// Construct the WeatherAPI.com provider from its configuration section.
pub fn provider_from_config(config: &ProviderConfig) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    Ok(Arc::new(WeatherApiProvider::new(config)?))
}
