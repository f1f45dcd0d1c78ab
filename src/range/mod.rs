//! Date range computation and navigation.
//!
//! The dashboard filters every card, chart and list by one [`DateRange`].
//! Ranges come from three places:
//!
//! 1. a named or fixed-duration preset, resolved against "now"
//!    ([`resolver::resolve`]),
//! 2. paging an existing range backward or forward by its own length
//!    ([`navigator::navigate`]),
//! 3. an explicit pair of endpoints ([`validation::validate_custom`]).

pub mod calendar;
pub mod label;
pub mod navigator;
pub mod resolver;
pub mod selector;
pub mod validation;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::core::errors::{RangeViolation, RbError, Result};

use self::calendar::{days_between, format_timestamp};

/// A closed interval of wall-clock instants with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(RbError::InvalidRange {
                start: format_timestamp(start),
                end: format_timestamp(end),
                violation: RangeViolation::EndBeforeStart,
            });
        }
        Ok(Self { start, end })
    }

    /// Internal constructor for callers that produce ordered endpoints by
    /// construction.
    pub(crate) fn ordered(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start <= end, "range endpoints out of order: {start} > {end}");
        Self { start, end }
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Inclusive day count: whole days between the endpoints, plus one.
    #[must_use]
    pub fn length_days(&self) -> i64 {
        days_between(self.end, self.start) + 1
    }

    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Every calendar date touched by the range, oldest first.
    pub fn calendar_days(self) -> impl Iterator<Item = NaiveDate> {
        let last = self.end.date();
        self.start
            .date()
            .iter_days()
            .take_while(move |d| *d <= last)
    }
}

/// Source of "now" for everything that anchors to the present.
pub trait Clock {
    /// Current wall-clock instant.
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant, for tests and `--now` overrides.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
