use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Local, SecondsFormat, TimeZone};

use crate::error::{ReqlogError, Result};

/// RFC 3339 with whole seconds and `Z` for a zero offset. Used both for the
/// `time` field of captured records and for log file names.
pub fn format_timestamp<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(input)
        .map_err(|e| ReqlogError::Parse(format!("expected RFC3339 time, got {input}: {e}")))
}

/// Parses a time bound taken from a query string. A `+` in an offset arrives
/// as a space after form decoding, so spaces are turned back into `+` first.
pub fn parse_query_time(input: &str) -> Result<DateTime<FixedOffset>> {
    parse_timestamp(&input.replace(' ', "+"))
}
