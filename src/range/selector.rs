//! Period selectors: the symbolic choice a user makes in the range picker.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use crate::core::errors::{RbError, Result};

use super::DateRange;

/// Window used when a selector name is not recognized.
pub const FALLBACK_DAYS: u32 = 30;

/// Longest `Ndays` window accepted by name.
pub const MAX_LAST_DAYS: u32 = 36_500;

/// Fixed-duration presets offered by the toggle buttons, in display order.
pub const FIXED_PRESET_DAYS: [u32; 4] = [7, 30, 90, 365];

/// What the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodSelector {
    /// The last `n` days up to now (`7days`, `30days`, ...).
    /// Parsing accepts `1..=MAX_LAST_DAYS`.
    LastDays(u32),
    Today,
    ThisMonth,
    LastMonth,
    ThisYear,
    /// An explicit, already-validated range.
    Custom(DateRange),
}

impl Default for PeriodSelector {
    fn default() -> Self {
        Self::LastDays(FALLBACK_DAYS)
    }
}

/// Result of lenient parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenientSelector {
    pub selector: PeriodSelector,
    /// True when the input was not recognized and the default was substituted.
    pub fell_back: bool,
}

impl PeriodSelector {
    /// Parse a selector name, substituting the 30-day window for anything
    /// unrecognized. Never fails.
    #[must_use]
    pub fn parse_or_default(name: &str) -> LenientSelector {
        match name.parse::<Self>() {
            Ok(selector) => LenientSelector {
                selector,
                fell_back: false,
            },
            Err(_) => LenientSelector {
                selector: Self::default(),
                fell_back: true,
            },
        }
    }

    /// Stable machine name (`30days`, `thisMonth`, `custom`).
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::LastDays(n) => format!("{n}days"),
            Self::Today => "today".to_string(),
            Self::ThisMonth => "thisMonth".to_string(),
            Self::LastMonth => "lastMonth".to_string(),
            Self::ThisYear => "thisYear".to_string(),
            Self::Custom(_) => "custom".to_string(),
        }
    }

    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for PeriodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for PeriodSelector {
    type Err = RbError;

    /// Strict parse. `custom` is rejected here because a custom selector
    /// carries its own range and cannot be built from a name alone.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        let unknown = || RbError::UnknownSelector {
            name: s.to_string(),
        };

        match key.as_str() {
            "today" => return Ok(Self::Today),
            "thismonth" => return Ok(Self::ThisMonth),
            "lastmonth" => return Ok(Self::LastMonth),
            "thisyear" => return Ok(Self::ThisYear),
            _ => {}
        }

        let digits = key
            .strip_suffix("days")
            .or_else(|| key.strip_suffix('d'))
            .ok_or_else(unknown)?;
        match digits.parse::<u32>() {
            Ok(n) if (1..=MAX_LAST_DAYS).contains(&n) => Ok(Self::LastDays(n)),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_presets() {
        for days in FIXED_PRESET_DAYS {
            let name = format!("{days}days");
            assert_eq!(
                name.parse::<PeriodSelector>().unwrap(),
                PeriodSelector::LastDays(days)
            );
        }
        assert_eq!(
            "14d".parse::<PeriodSelector>().unwrap(),
            PeriodSelector::LastDays(14)
        );
    }

    #[test]
    fn parses_calendar_presets_in_any_case_style() {
        for input in ["thisMonth", "this_month", "this-month", "THISMONTH"] {
            assert_eq!(
                input.parse::<PeriodSelector>().unwrap(),
                PeriodSelector::ThisMonth,
                "input {input}"
            );
        }
        assert_eq!(
            "lastMonth".parse::<PeriodSelector>().unwrap(),
            PeriodSelector::LastMonth
        );
        assert_eq!(
            "thisYear".parse::<PeriodSelector>().unwrap(),
            PeriodSelector::ThisYear
        );
        assert_eq!(
            "today".parse::<PeriodSelector>().unwrap(),
            PeriodSelector::Today
        );
    }

    #[test]
    fn strict_parse_rejects_unknown_and_zero() {
        for input in ["30dayz", "", "0days", "custom", "days", "weekly"] {
            let err = input.parse::<PeriodSelector>().unwrap_err();
            assert_eq!(err.code(), "RB-2001", "input {input:?}");
        }
    }

    #[test]
    fn day_count_is_capped() {
        assert_eq!(
            format!("{MAX_LAST_DAYS}days").parse::<PeriodSelector>().unwrap(),
            PeriodSelector::LastDays(MAX_LAST_DAYS)
        );
        for input in ["36501days", "100000000days", "4294967296days"] {
            let err = input.parse::<PeriodSelector>().unwrap_err();
            assert_eq!(err.code(), "RB-2001", "input {input:?}");
        }
    }

    #[test]
    fn lenient_parse_falls_back_to_thirty_days() {
        let parsed = PeriodSelector::parse_or_default("30dayz");
        assert!(parsed.fell_back);
        assert_eq!(parsed.selector, PeriodSelector::LastDays(30));

        let parsed = PeriodSelector::parse_or_default("7days");
        assert!(!parsed.fell_back);
        assert_eq!(parsed.selector, PeriodSelector::LastDays(7));
    }

    #[test]
    fn name_roundtrips_through_parse() {
        for selector in [
            PeriodSelector::LastDays(90),
            PeriodSelector::Today,
            PeriodSelector::ThisMonth,
            PeriodSelector::LastMonth,
            PeriodSelector::ThisYear,
        ] {
            assert_eq!(selector.name().parse::<PeriodSelector>().unwrap(), selector);
        }
    }
}
