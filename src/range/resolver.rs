//! Selector → concrete range, anchored to "now".

use chrono::NaiveDateTime;

use super::DateRange;
use super::calendar::{
    add_days, end_of_day, end_of_month, start_of_day, start_of_month, start_of_year,
    subtract_months,
};
use super::selector::PeriodSelector;

/// Resolve a selector against `now`.
///
/// Total over [`PeriodSelector`]: every variant yields a range. Unknown
/// selector *names* never reach this function; they are mapped to the
/// 30-day default by [`PeriodSelector::parse_or_default`]. A start that
/// would fall before the representable calendar is pinned to its first day.
#[must_use]
pub fn resolve(selector: &PeriodSelector, now: NaiveDateTime) -> DateRange {
    match *selector {
        PeriodSelector::Today => DateRange::ordered(start_of_day(now), end_of_day(now)),
        PeriodSelector::ThisMonth => DateRange::ordered(start_of_month(now), now),
        PeriodSelector::LastMonth => match subtract_months(now, 1) {
            Some(month) => DateRange::ordered(start_of_month(month), end_of_month(month)),
            None => DateRange::ordered(NaiveDateTime::MIN, start_of_month(now)),
        },
        PeriodSelector::ThisYear => DateRange::ordered(start_of_year(now), now),
        PeriodSelector::LastDays(days) => {
            let start = add_days(now, -i64::from(days)).map_or(NaiveDateTime::MIN, start_of_day);
            DateRange::ordered(start, now)
        }
        PeriodSelector::Custom(range) => range,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use super::*;
    use crate::range::calendar::END_OF_DAY_TIME;
    use crate::range::selector::FIXED_PRESET_DAYS;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn thirty_days_from_mid_march() {
        let now = at(2024, 3, 15, 12);
        let r = resolve(&PeriodSelector::LastDays(30), now);
        assert_eq!(r.start(), at(2024, 2, 14, 0));
        assert_eq!(r.end(), now);
    }

    #[test]
    fn fixed_presets_end_now_and_start_at_midnight() {
        let now = at(2023, 7, 4, 18);
        for days in FIXED_PRESET_DAYS {
            let r = resolve(&PeriodSelector::LastDays(days), now);
            assert_eq!(r.end(), now);
            let start = add_days(now, -i64::from(days)).map(start_of_day);
            assert_eq!(Some(r.start()), start);
        }
    }

    #[test]
    fn today_spans_the_whole_day() {
        let now = at(2024, 3, 15, 12);
        let r = resolve(&PeriodSelector::Today, now);
        assert_eq!(r.start(), at(2024, 3, 15, 0));
        assert_eq!(r.end().date(), now.date());
        assert_eq!(r.end().time(), END_OF_DAY_TIME);
    }

    #[test]
    fn this_month_and_this_year_end_now() {
        let now = at(2024, 3, 15, 12);
        let month = resolve(&PeriodSelector::ThisMonth, now);
        assert_eq!(month.start(), at(2024, 3, 1, 0));
        assert_eq!(month.end(), now);

        let year = resolve(&PeriodSelector::ThisYear, now);
        assert_eq!(year.start(), at(2024, 1, 1, 0));
        assert_eq!(year.end(), now);
    }

    #[test]
    fn last_month_from_march_31st_is_leap_february() {
        let r = resolve(&PeriodSelector::LastMonth, at(2024, 3, 31, 9));
        assert_eq!(r.start(), at(2024, 2, 1, 0));
        assert_eq!(r.end().date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(r.end().time(), END_OF_DAY_TIME);
    }

    #[test]
    fn last_month_in_non_leap_year() {
        let r = resolve(&PeriodSelector::LastMonth, at(2023, 3, 30, 9));
        assert_eq!(r.end().date(), NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn last_month_in_january_is_previous_december() {
        let r = resolve(&PeriodSelector::LastMonth, at(2024, 1, 10, 9));
        assert_eq!(r.start(), at(2023, 12, 1, 0));
        assert_eq!(r.end().date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(r.start().year(), 2023);
    }

    #[test]
    fn custom_is_returned_verbatim() {
        let custom = DateRange::new(at(2024, 1, 3, 5), at(2024, 1, 9, 7)).unwrap();
        assert_eq!(
            resolve(&PeriodSelector::Custom(custom), at(2030, 1, 1, 0)),
            custom
        );
    }

    #[test]
    fn huge_day_count_pins_start_to_first_representable_day() {
        let now = at(2024, 3, 15, 12);
        let r = resolve(&PeriodSelector::LastDays(u32::MAX), now);
        assert_eq!(r.start(), NaiveDateTime::MIN);
        assert_eq!(r.end(), now);
    }

    #[test]
    fn last_month_at_the_calendar_floor_still_resolves() {
        let r = resolve(&PeriodSelector::LastMonth, NaiveDateTime::MIN);
        assert!(r.start() <= r.end());
    }

    #[test]
    fn unrecognized_name_resolves_like_thirty_days() {
        let now = at(2024, 3, 15, 12);
        let lenient = PeriodSelector::parse_or_default("fortnight");
        assert_eq!(
            resolve(&lenient.selector, now),
            resolve(&PeriodSelector::LastDays(30), now)
        );
    }
}
