//! Due date parsing.
//!
//! Accepted input, all normalized to `YYYY-MM-DD HH:MM`:
//! - `YYYY-MM-DD HH:MM` as is
//! - `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD` at 23:59
//! - `MM/DD`, `MM-DD` in the current year at 23:59
//! - `today`, `tomorrow`, `<N>days` relative to now at 23:59
//! - `none` clears the due date

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::task::TIMESTAMP_FORMAT;

/// Literal that clears a due date
pub const CLEAR_KEYWORD: &str = "none";

const ACCEPTED_FORMS: &str =
    "YYYY-MM-DD HH:MM, YYYY-MM-DD, YYYY/MM/DD, YYYYMMDD, MM/DD, MM-DD, today, tomorrow, <N>days, none";

/// Parse user input into a due date. `Ok(None)` means "no due date".
pub fn parse_due(input: &str, now: NaiveDateTime) -> Result<Option<NaiveDateTime>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(CLEAR_KEYWORD) {
        return Ok(None);
    }

    if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Ok(Some(value));
    }

    if let Some(date) = parse_date(trimmed, now.date()) {
        return end_of_day(date).map(Some);
    }

    if let Some(days) = relative_days(trimmed) {
        let date = Duration::try_days(days)
            .and_then(|offset| now.date().checked_add_signed(offset))
            .ok_or_else(|| Error::Validation(format!("due date '{trimmed}' is out of range")))?;
        return end_of_day(date).map(Some);
    }

    Err(Error::Validation(format!(
        "unrecognized due date '{trimmed}' (accepted: {ACCEPTED_FORMS})"
    )))
}

/// A due date is overdue once `now` is strictly past it
pub fn is_overdue(due: NaiveDateTime, now: NaiveDateTime) -> bool {
    now > due
}

fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime> {
    date.and_hms_opt(23, 59, 0)
        .ok_or_else(|| Error::Validation(format!("invalid due date {date}")))
}

fn parse_date(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    if value.len() == 8 && is_digits(value) {
        return NaiveDate::from_ymd_opt(
            value[..4].parse().ok()?,
            value[4..6].parse().ok()?,
            value[6..].parse().ok()?,
        );
    }

    for separator in ['-', '/'] {
        let parts: Vec<&str> = value.split(separator).collect();
        if parts.len() < 2 || !parts.iter().all(|part| is_digits(part)) {
            continue;
        }
        return match parts.as_slice() {
            [year, month, day] if year.len() == 4 => NaiveDate::from_ymd_opt(
                year.parse().ok()?,
                month.parse().ok()?,
                day.parse().ok()?,
            ),
            [month, day] => {
                NaiveDate::from_ymd_opt(today.year(), month.parse().ok()?, day.parse().ok()?)
            }
            _ => None,
        };
    }

    None
}

fn relative_days(value: &str) -> Option<i64> {
    let lower = value.to_ascii_lowercase();
    match lower.as_str() {
        "today" => Some(0),
        "tomorrow" => Some(1),
        other => other
            .strip_suffix("days")
            .or_else(|| other.strip_suffix("day"))
            .and_then(|count| count.trim().parse::<i64>().ok()),
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
