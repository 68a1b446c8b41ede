use std::fmt;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};

use crate::error::{DataAccessError, Result};

/// Date and time values a dataset property can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateTime {
    Date(NaiveDate),
    Time(NaiveTime),
    TimeStamp(NaiveDateTime),
    TimeStampTz(chrono::DateTime<FixedOffset>),
}

impl DateTime {
    /// Parses ISO 8601 text, trying the most specific form first.
    ///
    /// A trailing `Z` or offset yields [`DateTime::TimeStampTz`], a date with a
    /// time part yields [`DateTime::TimeStamp`], and plain dates or times map to
    /// their own variants.
    pub fn parse(text: &str) -> Result<DateTime> {
        let text = text.trim();
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(text) {
            return Ok(DateTime::TimeStampTz(ts));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(DateTime::TimeStamp(ts));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Ok(DateTime::Date(date));
        }
        if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M:%S%.f") {
            return Ok(DateTime::Time(time));
        }
        Err(DataAccessError::ValueParse {
            value: text.to_string(),
            target: "datetime",
        })
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTime::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DateTime::Time(time) => write!(f, "{}", time.format("%H:%M:%S%.f")),
            DateTime::TimeStamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S%.f")),
            DateTime::TimeStampTz(ts) => {
                write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}
