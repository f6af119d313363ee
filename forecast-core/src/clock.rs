//! Parsing of the caller's date and tee time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

use crate::error::ForecastError;

const DATE_FORMATS: &[&str] =
    &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y"];

/// Parse a calendar date in any of the accepted spellings.
pub fn parse_date(input: &str) -> Result<NaiveDate, ForecastError> {
    let input = input.trim();

    let parsed = DATE_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok());
    if let Some(date) = parsed {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.date_naive());
    }

    Err(ForecastError::InvalidParameter {
        field: "date",
        reason: format!("'{input}' is not a recognised calendar date (expected YYYY-MM-DD)"),
    })
}

/// Canonical `YYYY-MM-DD` form sent to the provider.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Minutes since midnight for a clock time such as "1:30 PM", "7 am" or "14:30".
///
/// `12 AM` is midnight and `12 PM` is noon; any other PM hour gains twelve hours.
pub fn minute_of_day(input: &str) -> Result<u32, ForecastError> {
    let invalid = || ForecastError::InvalidParameter {
        field: "time",
        reason: format!("'{}' is not a clock time (expected h:mm AM/PM)", input.trim()),
    };

    let upper = input.trim().to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (hours, minutes) = match clock.split_once(':') {
        Some((h, m)) => (h, m),
        None if meridiem.is_some() => (clock, "0"),
        None => return Err(invalid()),
    };
    let hours: u32 = hours.trim().parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    let hours = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hours) {
                return Err(invalid());
            }
            match (hours, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None if hours < 24 => hours,
        None => return Err(invalid()),
    };

    Ok(hours * 60 + minutes)
}

/// Minutes since midnight of a provider hour stamp ("2025-08-19 11:00").
pub fn provider_minute_of_day(stamp: &str) -> Option<u32> {
    NaiveDateTime::parse_from_str(stamp.trim(), "%Y-%m-%d %H:%M")
        .ok()
        .map(|dt| dt.hour() * 60 + dt.minute())
}
