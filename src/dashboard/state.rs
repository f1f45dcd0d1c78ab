//! Dashboard state: active selector, current range and the latest data.
//!
//! Every range change (preset, custom pair, paging) goes through this type.
//! Data loads are modelled as a ticketed request/complete pair so that a
//! slow load for an old range can never overwrite a newer one.

#![allow(missing_docs)]

use chrono::NaiveDateTime;

use crate::core::errors::Result;
use crate::metrics::DisplayData;
use crate::range::DateRange;
use crate::range::label::format_label;
use crate::range::navigator::{self, Direction, Navigation};
use crate::range::resolver::resolve;
use crate::range::selector::PeriodSelector;
use crate::range::validation::validate_custom;

/// Handle for one outstanding data load. Only the most recently issued
/// ticket may publish its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    range: DateRange,
}

impl LoadTicket {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Range the load was requested for.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }
}

/// Result of offering loaded data to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    Applied,
    /// A newer request was issued after this ticket; the data was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    selector: PeriodSelector,
    range: DateRange,
    latest_generation: u64,
    pending: Option<u64>,
    data: Option<DisplayData>,
}

impl DashboardState {
    /// Start on `selector` resolved against `now`.
    #[must_use]
    pub fn new(selector: PeriodSelector, now: NaiveDateTime) -> Self {
        Self {
            selector,
            range: resolve(&selector, now),
            latest_generation: 0,
            pending: None,
            data: None,
        }
    }

    #[must_use]
    pub const fn selector(&self) -> PeriodSelector {
        self.selector
    }

    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Data for the latest completed load, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&DisplayData> {
        self.data.as_ref()
    }

    /// Picker label for the current range.
    #[must_use]
    pub fn label(&self) -> String {
        format_label(&self.range)
    }

    /// Switch to a preset and resolve it against `now`.
    pub fn select(&mut self, selector: PeriodSelector, now: NaiveDateTime) -> DateRange {
        self.selector = selector;
        self.range = resolve(&selector, now);
        self.range
    }

    /// Validate and apply an explicit pair. On error the state is unchanged.
    pub fn apply_custom(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<DateRange> {
        let range = validate_custom(start, end, now)?;
        self.selector = PeriodSelector::Custom(range);
        self.range = range;
        Ok(range)
    }

    /// Page the current range. The selector keeps its identity (a paged
    /// `7days` still reads "Last 7 days"); only the dates move.
    pub fn navigate(&mut self, direction: Direction, now: NaiveDateTime) -> Navigation {
        let outcome = navigator::navigate(&self.range, direction, now);
        self.range = outcome.range();
        outcome
    }

    /// Recomputed from the clock on every call.
    #[must_use]
    pub fn can_navigate_next(&self, now: NaiveDateTime) -> bool {
        navigator::can_navigate_next(&self.range, now)
    }

    /// Issue a load for the current range, superseding any outstanding one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_generation += 1;
        self.pending = Some(self.latest_generation);
        LoadTicket {
            generation: self.latest_generation,
            range: self.range,
        }
    }

    /// Publish data for `ticket` if it is still the latest request.
    pub fn finish_load(&mut self, ticket: LoadTicket, data: DisplayData) -> LoadResult {
        if ticket.generation != self.latest_generation {
            return LoadResult::Stale;
        }
        self.pending = None;
        self.data = Some(data);
        LoadResult::Applied
    }

    /// True while the latest request has not completed.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}
