//! String validators for resource attributes.

use chrono::{NaiveDate, NaiveTime};

/// Time of day in 24-hour `HH:MM:SS`.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Calendar date as `MM-DD-YYYY`.
pub const EXPIRY_DATE_FORMAT: &str = "%m-%d-%Y";

pub fn non_negative_integer(value: &str) -> Result<(), String> {
    value
        .parse::<u64>()
        .map(|_| ())
        .map_err(|_| format!("'{}' is not a whole number of seconds", value))
}

/// Names that end up as a URL path segment.
///
/// Percent-encoding keeps any other character inside its segment, but `.`
/// and `..` are resolved as dot segments by every URL parser.
pub fn path_segment(value: &str) -> Result<(), String> {
    match value {
        "" => Err("name must not be empty".to_string()),
        "." | ".." => Err(format!("'{}' cannot be used as a name", value)),
        _ => Ok(()),
    }
}

pub fn time_of_day(value: &str) -> Result<(), String> {
    NaiveTime::parse_from_str(value, TIME_OF_DAY_FORMAT)
        .map(|_| ())
        .map_err(|e| format!("'{}' is not a time of day (HH:MM:SS): {}", value, e))
}

pub fn expiry_date(value: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, EXPIRY_DATE_FORMAT)
        .map(|_| ())
        .map_err(|e| format!("'{}' is not a date (MM-DD-YYYY): {}", value, e))
}
