//! Reduction of a provider forecast to the tee-time summary.

use chrono::DateTime;

use crate::{
    clock::provider_minute_of_day,
    error::ForecastError,
    model::{NOT_AVAILABLE, NormalizedForecast, ProviderDay, ProviderForecast, ProviderHour},
};

/// Build the summary for `date` (`YYYY-MM-DD`) at `minute` past midnight.
pub fn normalize(
    forecast: &ProviderForecast,
    date: &str,
    minute: u32,
) -> Result<NormalizedForecast, ForecastError> {
    let day = forecast
        .days
        .iter()
        .find(|d| d.date == date)
        .ok_or_else(|| ForecastError::NoForecastForDate(date.to_string()))?;

    let hour = nearest_hour(&day.hours, minute);

    Ok(summarize(day, hour, forecast.last_updated_epoch))
}

/// Hour whose clock time is closest to `minute`; earlier hours win ties.
///
/// Records with an unreadable time stamp are skipped.
pub fn nearest_hour(hours: &[ProviderHour], minute: u32) -> Option<&ProviderHour> {
    hours
        .iter()
        .filter_map(|h| provider_minute_of_day(&h.time).map(|m| (h, m)))
        .min_by_key(|(_, m)| (m.abs_diff(minute), *m))
        .map(|(h, _)| h)
}

fn summarize(
    day: &ProviderDay,
    hour: Option<&ProviderHour>,
    updated: Option<i64>,
) -> NormalizedForecast {
    NormalizedForecast {
        high_temp_day: fahrenheit(day.max_temp_f),
        conditions_tee_time: hour
            .and_then(|h| h.condition.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map_or_else(not_available, str::to_string),
        feels_like_temp: fahrenheit(hour.and_then(|h| h.feels_like_f)),
        precipitation_chance: percent(day.chance_of_rain),
        wind_speed_direction: hour.map_or_else(not_available, wind),
        uv_index: rounded(day.uv).map_or_else(not_available, |uv| uv.to_string()),
        forecast_updated: updated.and_then(medium_date_short_time).unwrap_or_else(not_available),
        api_forecast_date: Some(day.date.clone()),
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn rounded(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.round() as i64)
}

fn fahrenheit(value: Option<f64>) -> String {
    rounded(value).map_or_else(not_available, |t| format!("{t}°F"))
}

fn percent(value: Option<f64>) -> String {
    rounded(value).map_or_else(not_available, |p| format!("{p}%"))
}

/// "7 mph from NW"; the direction is dropped when the provider omits it.
fn wind(hour: &ProviderHour) -> String {
    let Some(speed) = rounded(hour.wind_mph) else {
        return not_available();
    };
    match hour.wind_dir.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) => format!("{speed} mph from {dir}"),
        None => format!("{speed} mph"),
    }
}

/// "Aug 19, 2025, 2:30 PM" in UTC.
fn medium_date_short_time(epoch: i64) -> Option<String> {
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.format("%b %-d, %Y, %-I:%M %p").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(time: &str) -> ProviderHour {
        ProviderHour { time: format!("2025-08-19 {time}"), ..Default::default() }
    }

    fn sample_day() -> ProviderDay {
        let mut tee = hour("11:00");
        tee.temp_f = Some(78.1);
        tee.feels_like_f = Some(79.6);
        tee.wind_mph = Some(7.2);
        tee.wind_dir = Some("NW".into());
        tee.condition = Some("Partly cloudy".into());

        ProviderDay {
            date: "2025-08-19".into(),
            max_temp_f: Some(82.4),
            chance_of_rain: Some(20.0),
            uv: Some(6.7),
            hours: vec![hour("10:00"), tee, hour("12:00")],
        }
    }

    #[test]
    fn picks_closest_hour() {
        let day = sample_day();
        let picked = nearest_hour(&day.hours, 11 * 60 + 20).unwrap();
        assert_eq!(picked.time, "2025-08-19 11:00");
    }

    #[test]
    fn ties_go_to_the_earlier_hour() {
        let hours = vec![hour("10:00"), hour("11:00")];
        assert_eq!(nearest_hour(&hours, 10 * 60 + 30).unwrap().time, "2025-08-19 10:00");

        let reversed = vec![hour("11:00"), hour("10:00")];
        assert_eq!(nearest_hour(&reversed, 10 * 60 + 30).unwrap().time, "2025-08-19 10:00");
    }

    #[test]
    fn unreadable_hour_stamps_are_ignored() {
        let hours = vec![ProviderHour { time: "soon".into(), ..Default::default() }, hour("15:00")];
        assert_eq!(nearest_hour(&hours, 0).unwrap().time, "2025-08-19 15:00");
        assert!(nearest_hour(&[], 0).is_none());
    }

    #[test]
    fn tee_time_summary() {
        let forecast =
            ProviderForecast { days: vec![sample_day()], last_updated_epoch: Some(1_755_613_800) };

        let summary = normalize(&forecast, "2025-08-19", 11 * 60 + 20).unwrap();

        assert_eq!(
            summary,
            NormalizedForecast {
                high_temp_day: "82°F".into(),
                conditions_tee_time: "Partly cloudy".into(),
                feels_like_temp: "80°F".into(),
                precipitation_chance: "20%".into(),
                wind_speed_direction: "7 mph from NW".into(),
                uv_index: "7".into(),
                forecast_updated: "Aug 19, 2025, 2:30 PM".into(),
                api_forecast_date: Some("2025-08-19".into()),
            }
        );
    }

    #[test]
    fn missing_values_render_as_not_available() {
        let forecast = ProviderForecast {
            days: vec![ProviderDay {
                date: "2025-08-19".into(),
                hours: vec![hour("09:00")],
                ..Default::default()
            }],
            last_updated_epoch: None,
        };

        let summary = normalize(&forecast, "2025-08-19", 540).unwrap();

        for field in [
            &summary.high_temp_day,
            &summary.conditions_tee_time,
            &summary.feels_like_temp,
            &summary.precipitation_chance,
            &summary.wind_speed_direction,
            &summary.uv_index,
            &summary.forecast_updated,
        ] {
            assert_eq!(field, "N/A");
        }
    }

    #[test]
    fn day_without_hours_still_summarizes() {
        let mut day = sample_day();
        day.hours.clear();
        let forecast = ProviderForecast { days: vec![day], last_updated_epoch: None };

        let summary = normalize(&forecast, "2025-08-19", 600).unwrap();
        assert_eq!(summary.high_temp_day, "82°F");
        assert_eq!(summary.conditions_tee_time, "N/A");
        assert_eq!(summary.wind_speed_direction, "N/A");
    }

    #[test]
    fn wind_without_direction() {
        let h = ProviderHour { wind_mph: Some(12.5), ..hour("08:00") };
        assert_eq!(wind(&h), "13 mph");
    }

    #[test]
    fn unknown_date_is_not_found() {
        let forecast = ProviderForecast { days: vec![sample_day()], last_updated_epoch: None };
        match normalize(&forecast, "2025-08-20", 600).unwrap_err() {
            ForecastError::NoForecastForDate(date) => assert_eq!(date, "2025-08-20"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
