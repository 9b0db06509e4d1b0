// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for lesson date/time parsing and formatting.
//!
//! The API sends lesson dates as `YYYY-MM-DD` (occasionally a full ISO
//! timestamp) and times as `HH:MM` or `HH:MM:SS`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Default lesson length applied by the booking form.
pub const DEFAULT_LESSON_HOURS: i64 = 2;

/// Parse a lesson date, ignoring any time component.
pub fn parse_lesson_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse a lesson time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_lesson_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Combine a lesson date and time into a local datetime.
pub fn lesson_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    Some(parse_lesson_date(date)?.and_time(parse_lesson_time(time)?))
}

/// Format a lesson time for display, e.g. `14:05` -> `2:05 PM`.
pub fn format_time_12h(raw: &str) -> Option<String> {
    let time = parse_lesson_time(raw)?;
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    Some(format!("{}:{:02} {}", hour, time.minute(), suffix))
}

/// End time the booking form proposes for a given start time.
///
/// Wraps past midnight like a wall clock; callers reject such slots.
pub fn default_end_time(start: &str) -> Option<String> {
    let start = parse_lesson_time(start)?;
    let end = start + Duration::hours(DEFAULT_LESSON_HOURS);
    Some(end.format("%H:%M").to_string())
}

/// Format a date as the backend expects it.
pub fn format_lesson_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
