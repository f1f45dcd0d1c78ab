//! Previous/next paging by a range's own length, with a ceiling at today.

#![allow(missing_docs)]

use chrono::NaiveDateTime;
use serde::Serialize;

use super::DateRange;
use super::calendar::{add_days, is_today_or_later};

/// Paging direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Previous,
    Next,
}

/// Outcome of a paging request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Shifted by exactly one period.
    Moved(DateRange),
    /// Shifted forward but pulled back so the end sits at "now"; the
    /// window length is unchanged.
    Clamped(DateRange),
    /// Forward paging refused because the range already reaches today.
    /// Carries the unchanged input.
    ForwardDisabled(DateRange),
    /// The shifted range would leave the representable calendar. Carries
    /// the unchanged input.
    OutOfBounds(DateRange),
}

impl Navigation {
    /// The range to display after the request.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        match *self {
            Self::Moved(r) | Self::Clamped(r) | Self::ForwardDisabled(r) | Self::OutOfBounds(r) => r,
        }
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self, Self::ForwardDisabled(_))
    }

    #[must_use]
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::OutOfBounds(_))
    }

    /// Whether the range actually changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Moved(_) | Self::Clamped(_))
    }

    #[must_use]
    pub const fn is_clamped(&self) -> bool {
        matches!(self, Self::Clamped(_))
    }

    /// Short machine label for logs and JSON output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Moved(_) => "moved",
            Self::Clamped(_) => "clamped",
            Self::ForwardDisabled(_) => "forward_disabled",
            Self::OutOfBounds(_) => "out_of_bounds",
        }
    }
}

/// Whether forward paging is currently allowed. Derived from the range and
/// the clock on every call; never cache it across renders.
#[must_use]
pub fn can_navigate_next(current: &DateRange, now: NaiveDateTime) -> bool {
    !is_today_or_later(current.end(), now)
}

/// Page `current` one period in `direction`.
///
/// Both endpoints shift by the range's inclusive day count, so the time of
/// day survives and `Previous` followed by `Next` returns the original range.
/// A forward page that would end after `now` is clamped to end at `now`.
#[must_use]
pub fn navigate(current: &DateRange, direction: Direction, now: NaiveDateTime) -> Navigation {
    let period = current.length_days();

    match direction {
        Direction::Previous => match shift(current, -period) {
            Some(range) => Navigation::Moved(range),
            None => Navigation::OutOfBounds(*current),
        },
        Direction::Next => {
            if !can_navigate_next(current, now) {
                return Navigation::ForwardDisabled(*current);
            }

            match shift(current, period) {
                Some(range) if range.end() <= now => Navigation::Moved(range),
                _ => match add_days(now, -(period - 1)) {
                    Some(start) if start <= now => {
                        Navigation::Clamped(DateRange::ordered(start, now))
                    }
                    _ => Navigation::OutOfBounds(*current),
                },
            }
        }
    }
}

fn shift(range: &DateRange, days: i64) -> Option<DateRange> {
    let start = add_days(range.start(), days)?;
    let end = add_days(range.end(), days)?;
    Some(DateRange::ordered(start, end))
}
