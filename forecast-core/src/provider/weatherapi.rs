use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::{debug, error, instrument, warn};

use crate::{
    config::ProviderConfig,
    error::{ForecastError, UpstreamFailure},
    model::{ProviderDay, ProviderForecast, ProviderHour},
    retry::Attempt,
};

use super::ForecastProvider;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), http })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url)
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    #[instrument(skip(self, api_key))]
    async fn fetch_day(
        &self,
        api_key: &str,
        location: &str,
        date: &str,
    ) -> Attempt<ProviderForecast> {
        let res = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("key", api_key),
                ("q", location),
                ("dt", date),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await;

        // `without_url` keeps the key out of the message.
        let res = match res {
            Ok(res) => res,
            Err(e) => {
                return Attempt::Retryable(UpstreamFailure::transport(format!(
                    "Failed to send request to WeatherAPI.com: {}",
                    e.without_url()
                )));
            }
        };

        let status = res.status();
        let body = match res.text().await {
            Ok(body) => body,
            Err(e) => {
                return Attempt::Retryable(UpstreamFailure::transport(format!(
                    "Failed to read WeatherAPI forecast response body: {}",
                    e.without_url()
                )));
            }
        };

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "WeatherAPI forecast request failed");
            let upstream_message = upstream_error_message(&body);
            return Attempt::Retryable(UpstreamFailure::status(status, upstream_message));
        }

        match serde_json::from_str::<WaForecastResponse>(&body) {
            Ok(parsed) => {
                debug!(days = parsed.forecast.forecastday.len(), "WeatherAPI forecast received");
                Attempt::Success(parsed.into())
            }
            Err(e) => {
                error!(
                    error = %e,
                    body = %truncate_body(&body),
                    "WeatherAPI forecast JSON has unexpected shape"
                );
                Attempt::Terminal(ForecastError::MalformedResponse(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct WaDay {
    maxtemp_f: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    daily_chance_of_rain: Option<f64>,
    uv: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time: String,
    temp_f: Option<f64>,
    feelslike_f: Option<f64>,
    condition: Option<WaCondition>,
    wind_mph: Option<f64>,
    wind_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    #[serde(default)]
    day: WaDay,
    #[serde(default)]
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    current: Option<WaCurrent>,
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

impl From<WaForecastResponse> for ProviderForecast {
    fn from(res: WaForecastResponse) -> Self {
        Self {
            last_updated_epoch: res.current.and_then(|c| c.last_updated_epoch),
            days: res.forecast.forecastday.into_iter().map(ProviderDay::from).collect(),
        }
    }
}

impl From<WaForecastDay> for ProviderDay {
    fn from(day: WaForecastDay) -> Self {
        Self {
            date: day.date,
            max_temp_f: day.day.maxtemp_f,
            chance_of_rain: day.day.daily_chance_of_rain,
            uv: day.day.uv,
            hours: day.hour.into_iter().map(ProviderHour::from).collect(),
        }
    }
}

impl From<WaForecastHour> for ProviderHour {
    fn from(hour: WaForecastHour) -> Self {
        Self {
            time: hour.time,
            temp_f: hour.temp_f,
            feels_like_f: hour.feelslike_f,
            condition: hour.condition.and_then(|c| c.text),
            wind_mph: hour.wind_mph,
            wind_dir: hour.wind_dir,
        }
    }
}

/// WeatherAPI has sent `daily_chance_of_rain` both as a number and as a string.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn upstream_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<WaErrorBody>(body).ok().map(|b| b.error.message)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
