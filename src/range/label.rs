//! Human-readable labels for ranges and selectors.

use super::DateRange;
use super::selector::PeriodSelector;

/// Short label shown in the picker button: `01 Jan - 30 Jan`.
#[must_use]
pub fn format_label(range: &DateRange) -> String {
    format!(
        "{} - {}",
        range.start().format("%d %b"),
        range.end().format("%d %b")
    )
}

/// Long label with years: `14 Feb 2024 - 15 Mar 2024`.
#[must_use]
pub fn format_label_with_year(range: &DateRange) -> String {
    format!(
        "{} - {}",
        range.start().format("%d %b %Y"),
        range.end().format("%d %b %Y")
    )
}

/// Display name of the selector in preset lists and toggle buttons.
#[must_use]
pub fn selector_label(selector: &PeriodSelector) -> String {
    match selector {
        PeriodSelector::LastDays(1) => "Last 1 day".to_string(),
        PeriodSelector::LastDays(n) => format!("Last {n} days"),
        PeriodSelector::Today => "Today".to_string(),
        PeriodSelector::ThisMonth => "This month".to_string(),
        PeriodSelector::LastMonth => "Last month".to_string(),
        PeriodSelector::ThisYear => "This year".to_string(),
        PeriodSelector::Custom(_) => "Custom".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn short_label_zero_pads_days() {
        let r = DateRange::new(day(2024, 1, 1), day(2024, 1, 30)).unwrap();
        assert_eq!(format_label(&r), "01 Jan - 30 Jan");
    }

    #[test]
    fn long_label_includes_years() {
        let r = DateRange::new(day(2023, 12, 25), day(2024, 1, 3)).unwrap();
        assert_eq!(format_label_with_year(&r), "25 Dec 2023 - 03 Jan 2024");
    }

    #[test]
    fn selector_labels() {
        assert_eq!(selector_label(&PeriodSelector::LastDays(30)), "Last 30 days");
        assert_eq!(selector_label(&PeriodSelector::LastDays(1)), "Last 1 day");
        assert_eq!(selector_label(&PeriodSelector::LastMonth), "Last month");
    }
}
