use std::{fmt, sync::Arc, time::Duration};

use tracing::{debug, info, instrument};

use crate::{
    clock,
    config::{self, Config},
    error::ForecastError,
    forecast::normalize,
    model::{ForecastQuery, NormalizedForecast},
    provider::{ForecastProvider, provider_from_config},
    retry::{RetryPolicy, with_retry},
};

/// Validates a tee-time query, fetches the provider forecast with retries and normalizes it.
#[derive(Clone)]
pub struct ForecastService {
    provider: Arc<dyn ForecastProvider>,
    api_key: Option<String>,
    retry: RetryPolicy,
    deadline: Duration,
}

impl fmt::Debug for ForecastService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastService")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("retry", &self.retry)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl ForecastService {
    pub fn new(provider: Arc<dyn ForecastProvider>, api_key: Option<String>) -> Self {
        Self {
            provider,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            retry: RetryPolicy::default(),
            deadline: Duration::from_secs(config::default_deadline_secs()),
        }
    }

    /// Build the service against WeatherAPI.com from loaded configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(&config.weatherapi)?;
        Ok(Self::new(provider, config.weatherapi.api_key().map(str::to_string))
            .with_retry_policy(config.retry.clone())
            .with_deadline(Duration::from_secs(config.server.deadline_secs)))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Produce the tee-time summary for `query`.
    ///
    /// Input is validated before the credential is checked; neither failure touches the
    /// provider.
    #[instrument(
        skip(self, query),
        fields(location = ?query.location, date = ?query.date, time = ?query.time)
    )]
    pub async fn forecast(
        &self,
        query: &ForecastQuery,
    ) -> Result<NormalizedForecast, ForecastError> {
        let request = query.require()?;
        let date = clock::canonical_date(clock::parse_date(&request.date)?);
        let minute = clock::minute_of_day(&request.time)?;

        let api_key = self.api_key.as_deref().ok_or(ForecastError::MissingCredential)?;

        let fetch = with_retry(&self.retry, |attempt| {
            debug!(attempt, %date, "requesting provider forecast");
            self.provider.fetch_day(api_key, &request.location, &date)
        });

        let payload = tokio::time::timeout(self.deadline, fetch)
            .await
            .map_err(|_| ForecastError::DeadlineExceeded(self.deadline))??;

        let summary = normalize(&payload, &date, minute)?;
        info!(%date, minute, conditions = %summary.conditions_tee_time, "forecast normalized");
        Ok(summary)
    }
}
