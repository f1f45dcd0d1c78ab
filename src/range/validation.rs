//! Custom two-endpoint range validation and picker bounds.

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::errors::{RangeViolation, RbError, Result};

use super::DateRange;
use super::calendar::format_timestamp;

/// Validate an explicit custom selection: `start <= end` and `end <= now`.
///
/// This holds even when a picker UI already refused out-of-range dates.
pub fn validate_custom(
    start: NaiveDateTime,
    end: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<DateRange> {
    let violation = if start > end {
        Some(RangeViolation::EndBeforeStart)
    } else if end > now {
        Some(RangeViolation::EndInFuture)
    } else {
        None
    };

    match violation {
        Some(violation) => Err(RbError::InvalidRange {
            start: format_timestamp(start),
            end: format_timestamp(end),
            violation,
        }),
        None => Ok(DateRange::ordered(start, end)),
    }
}

/// Selectable calendar dates for one of the two pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerBounds {
    /// Earliest selectable date, if any.
    pub min: Option<NaiveDate>,
    /// Latest selectable date (always today).
    pub max: NaiveDate,
}

impl PickerBounds {
    /// Whether the picker should accept `date`.
    #[must_use]
    pub fn allows(&self, date: NaiveDate) -> bool {
        self.min.is_none_or(|min| date >= min) && date <= self.max
    }
}

/// The start picker refuses only dates after today.
#[must_use]
pub fn start_picker_bounds(now: NaiveDateTime) -> PickerBounds {
    PickerBounds {
        min: None,
        max: now.date(),
    }
}

/// The end picker refuses dates before the chosen start and after today.
#[must_use]
pub fn end_picker_bounds(start: Option<NaiveDateTime>, now: NaiveDateTime) -> PickerBounds {
    PickerBounds {
        min: start.map(|s| s.date()),
        max: now.date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn rejects_end_before_start() {
        let err = validate_custom(day(2024, 5, 10), day(2024, 5, 1), day(2024, 6, 1)).unwrap_err();
        assert!(matches!(
            err,
            RbError::InvalidRange {
                violation: RangeViolation::EndBeforeStart,
                ..
            }
        ));
    }

    #[test]
    fn rejects_end_after_now() {
        let err = validate_custom(day(2024, 5, 1), day(2024, 5, 10), day(2024, 5, 9)).unwrap_err();
        assert!(matches!(
            err,
            RbError::InvalidRange {
                violation: RangeViolation::EndInFuture,
                ..
            }
        ));
    }

    #[test]
    fn accepts_single_day_ending_exactly_now() {
        let now = day(2024, 5, 10);
        let r = validate_custom(now, now, now).unwrap();
        assert_eq!(r.start(), now);
        assert_eq!(r.end(), now);
    }

    #[test]
    fn picker_bounds_follow_start_and_today() {
        let now = day(2024, 5, 10);
        let start_bounds = start_picker_bounds(now);
        assert!(start_bounds.allows(day(1999, 1, 1).date()));
        assert!(!start_bounds.allows(day(2024, 5, 11).date()));

        let end_bounds = end_picker_bounds(Some(day(2024, 5, 3)), now);
        assert!(!end_bounds.allows(day(2024, 5, 2).date()));
        assert!(end_bounds.allows(day(2024, 5, 3).date()));
        assert!(end_bounds.allows(day(2024, 5, 10).date()));
        assert!(!end_bounds.allows(day(2024, 5, 11).date()));
    }
}
