//! Two-step custom range picker: choose a start day, then an end day.
//!
//! The cursor never leaves the active [`PickerBounds`], so the start picker
//! cannot select a day after today and the end picker cannot select a day
//! before the chosen start. The confirmed pair still goes through
//! [`DashboardState::apply_custom`](super::state::DashboardState::apply_custom).

#![allow(missing_docs)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::range::DateRange;
use crate::range::calendar::end_of_day;
use crate::range::validation::{PickerBounds, end_picker_bounds, start_picker_bounds};

/// Which endpoint the cursor is choosing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStage {
    Start,
    End { start: NaiveDate },
}

/// Overlay state while a custom range is being picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomPicker {
    stage: PickerStage,
    cursor: NaiveDate,
}

impl CustomPicker {
    /// Open on the current range's first day.
    #[must_use]
    pub fn open(current: &DateRange, now: NaiveDateTime) -> Self {
        let mut picker = Self {
            stage: PickerStage::Start,
            cursor: current.start().date(),
        };
        picker.cursor = picker.clamp(picker.cursor, now);
        picker
    }

    #[must_use]
    pub const fn stage(&self) -> PickerStage {
        self.stage
    }

    #[must_use]
    pub const fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    /// Selectable days for the current stage.
    #[must_use]
    pub fn bounds(&self, now: NaiveDateTime) -> PickerBounds {
        match self.stage {
            PickerStage::Start => start_picker_bounds(now),
            PickerStage::End { start } => {
                end_picker_bounds(Some(start.and_time(NaiveTime::MIN)), now)
            }
        }
    }

    /// Move the cursor by `days`, stopping at the bounds.
    pub fn move_by(&mut self, days: i64, now: NaiveDateTime) {
        let target = TimeDelta::try_days(days)
            .and_then(|delta| self.cursor.checked_add_signed(delta))
            .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX });
        self.cursor = self.clamp(target, now);
    }

    /// Confirm the cursor day. The first confirmation fixes the start and
    /// returns `None`; the second returns the instants to apply.
    pub fn confirm(&mut self, now: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match self.stage {
            PickerStage::Start => {
                self.stage = PickerStage::End { start: self.cursor };
                self.cursor = self.clamp(self.cursor, now);
                None
            }
            PickerStage::End { start } => Some((
                start.and_time(NaiveTime::MIN),
                end_instant(self.cursor, now),
            )),
        }
    }

    /// Step back to the start stage. Returns `false` when already there,
    /// which closes the picker.
    pub fn back(&mut self) -> bool {
        match self.stage {
            PickerStage::Start => false,
            PickerStage::End { start } => {
                self.stage = PickerStage::Start;
                self.cursor = start;
                true
            }
        }
    }

    fn clamp(&self, date: NaiveDate, now: NaiveDateTime) -> NaiveDate {
        let bounds = self.bounds(now);
        let date = bounds.min.map_or(date, |min| date.max(min));
        date.min(bounds.max)
    }
}

/// A picked end day covers the whole day, except today, which ends at now.
fn end_instant(date: NaiveDate, now: NaiveDateTime) -> NaiveDateTime {
    if date >= now.date() {
        now
    } else {
        end_of_day(date.and_time(NaiveTime::MIN))
    }
}
