use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Rendered in place of any value the provider did not send.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw query as received from the caller; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl ForecastQuery {
    pub fn new(
        location: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self { location: Some(location.into()), date: Some(date.into()), time: Some(time.into()) }
    }

    /// Check presence of all three fields, reporting every missing one at once.
    pub fn require(&self) -> Result<ForecastRequest, ForecastError> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        let location = present(&self.location);
        let date = present(&self.date);
        let time = present(&self.time);

        match (location, date, time) {
            (Some(location), Some(date), Some(time)) => Ok(ForecastRequest {
                location: location.to_string(),
                date: date.to_string(),
                time: time.to_string(),
            }),
            _ => {
                let missing = [("location", location), ("date", date), ("time", time)]
                    .into_iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(name, _)| name)
                    .collect();
                Err(ForecastError::MissingParameters(missing))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub location: String,
    /// Calendar date as the caller spelled it.
    pub date: String,
    /// Clock time, usually "h:mm AM/PM".
    pub time: String,
}

/// Tee-time summary returned to the caller. Every field is a display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedForecast {
    pub high_temp_day: String,
    pub conditions_tee_time: String,
    pub feels_like_temp: String,
    pub precipitation_chance: String,
    pub wind_speed_direction: String,
    pub uv_index: String,
    pub forecast_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_forecast_date: Option<String>,
}

/// Provider forecast reduced to the fields the proxy reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderForecast {
    pub days: Vec<ProviderDay>,
    /// Epoch seconds of the provider's last update of current conditions.
    pub last_updated_epoch: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub max_temp_f: Option<f64>,
    pub chance_of_rain: Option<f64>,
    pub uv: Option<f64>,
    /// Hourly records in chronological order.
    pub hours: Vec<ProviderHour>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderHour {
    /// Local wall-clock stamp, `YYYY-MM-DD HH:MM`.
    pub time: String,
    pub temp_f: Option<f64>,
    pub feels_like_f: Option<f64>,
    pub condition: Option<String>,
    pub wind_mph: Option<f64>,
    pub wind_dir: Option<String>,
}
