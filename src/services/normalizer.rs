//! Work-date normalization service
//!
//! Report dates arrive as `YYYY-MM-DD`, `YYYY/M/D`, or full ISO timestamps
//! (the spreadsheet serializes date cells as UTC midnight of the *local*
//! day). Everything is folded to canonical `YYYY-MM-DD` before aggregation.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Normalize a date string to `YYYY-MM-DD` in the viewer's local time.
///
/// # Examples
/// ```
/// use labtally::services::normalizer::normalize_date;
///
/// assert_eq!(normalize_date("2026/1/13"), "2026-01-13");
/// assert_eq!(normalize_date("2026-01-13"), "2026-01-13");
/// ```
pub fn normalize_date(input: &str) -> String {
    normalize_date_in(input, &Local)
}

/// Same as [`normalize_date`] with an explicit local timezone.
///
/// Timestamps are converted into `tz` before the calendar day is taken, so a
/// `...T15:00:00.000Z` value lands on the next day in UTC+9 rather than
/// shifting back a day.
pub fn normalize_date_in<Tz: TimeZone>(input: &str, tz: &Tz) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if trimmed.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return dt.with_timezone(tz).date_naive().format("%Y-%m-%d").to_string();
        }
        // Offset-less timestamps are already local
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return naive.date().format("%Y-%m-%d").to_string();
        }
    }

    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    let parts: Vec<&str> = date_part.split(['-', '/']).collect();
    if parts.len() != 3 {
        return trimmed.to_string();
    }

    format!("{}-{:0>2}-{:0>2}", parts[0], parts[1], parts[2])
}

/// Parse a normalized work date; `None` for anything that is not a real date
pub fn parse_work_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&normalize_date(input), "%Y-%m-%d").ok()
}
