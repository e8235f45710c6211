use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";
}

// Time helper functions

pub fn epoch_ms_to_date_string(epoch_ms: i64) -> String {
    // Used for display purposes
    epoch_sec_to_date_string(epoch_ms / 1000)
}

pub fn epoch_sec_to_date_string(epoch_sec: i64) -> String {
    // Used for display purposes
    let dt = DateTime::from_timestamp(epoch_sec, 0).expect("invalid timestamp");
    format!("{}", dt.format(TimeUtils::STANDARD_TIME_FORMAT))
}

/// Parses a `YYYY-MM-DD` date as midnight UTC, returned as epoch seconds.
pub fn parse_date_to_epoch_sec(text: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(text, TimeUtils::STANDARD_TIME_FORMAT)
        .with_context(|| format!("invalid date '{text}', expected YYYY-MM-DD"))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp())
}
