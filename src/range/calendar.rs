//! Calendar arithmetic on wall-clock timestamps.
//!
//! Every helper operates on [`NaiveDateTime`] values interpreted in the
//! user's local wall-clock time. Day boundaries follow the usual picker
//! convention: a day starts at `00:00:00.000` and ends at `23:59:59.999`.

use chrono::{
    DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
};

use crate::core::errors::{RbError, Result};

/// Last representable instant of a day at millisecond precision.
pub const END_OF_DAY_TIME: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(t) => t,
    None => panic!("23:59:59.999 is a valid time"),
};

/// Midnight at the start of `ts`'s day.
#[must_use]
pub fn start_of_day(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN)
}

/// Last instant of `ts`'s day.
#[must_use]
pub fn end_of_day(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(END_OF_DAY_TIME)
}

/// Midnight on the first day of `ts`'s month.
#[must_use]
pub fn start_of_month(ts: NaiveDateTime) -> NaiveDateTime {
    first_of_month(ts.date()).and_time(NaiveTime::MIN)
}

/// Last instant of the last day of `ts`'s month.
#[must_use]
pub fn end_of_month(ts: NaiveDateTime) -> NaiveDateTime {
    // Only December of the last representable year has no following month.
    let last_day = first_of_month(ts.date())
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    last_day.and_time(END_OF_DAY_TIME)
}

/// Midnight on January 1st of `ts`'s year.
#[must_use]
pub fn start_of_year(ts: NaiveDateTime) -> NaiveDateTime {
    let date = ts.date() - Days::new(u64::from(ts.ordinal0()));
    date.and_time(NaiveTime::MIN)
}

/// Step back `months` calendar months, clamping the day to the target
/// month's length (March 31st minus one month is February 28th/29th).
///
/// `None` when the result falls before the earliest representable date.
#[must_use]
pub fn subtract_months(ts: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    ts.checked_sub_months(Months::new(months))
}

/// Shift by a signed number of whole days, keeping the time of day.
///
/// `None` when the result leaves the representable calendar.
#[must_use]
pub fn add_days(ts: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_days(days).and_then(|delta| ts.checked_add_signed(delta))
}

/// Whole days from `earlier` to `later`, truncated toward zero.
#[must_use]
pub fn days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    (later - earlier).num_days()
}

/// Whether `ts` falls on `now`'s calendar day or later.
#[must_use]
pub fn is_today_or_later(ts: NaiveDateTime, now: NaiveDateTime) -> bool {
    ts.date() >= now.date()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Parse a user-supplied timestamp into local wall-clock time.
///
/// Accepted forms, tried in order:
/// - RFC 3339 with offset (`2024-03-15T12:00:00Z`), converted to local time
/// - `2024-03-15T12:00:00` / `2024-03-15 12:00:00` (fractional seconds allowed)
/// - `2024-03-15` (midnight)
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|e| RbError::TimestampParse {
            input: input.to_string(),
            details: e.to_string(),
        })
}

/// Canonical rendering used in logs, JSON output and error messages.
#[must_use]
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}
