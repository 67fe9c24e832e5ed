use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::{Dialect, parse_date_string};

/// Parses a check-in date. Accepts `2024-01-31` as well as relative phrases like `yesterday` or
/// `3 days ago`, which are resolved against `now`.
pub fn parse_check_in_date(input: &str, now: DateTime<Local>) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(input, now, Dialect::Uk)
        .map(|v| v.date_naive())
        .map_err(|e| anyhow!("Can't parse {input} into a date: {e}"))
}
