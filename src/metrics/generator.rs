//! Deterministic mock-data generator.
//!
//! Per-day figures are seeded from the calendar date alone, so a day shows
//! the same reach no matter which window contains it, and window totals are
//! plain sums of their days. Platform split and post list are seeded from
//! the window endpoints.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    CardKind, DisplayData, Platform, PlatformShare, PostSummary, SeriesPoint, StatCard,
};
use crate::range::DateRange;
use crate::range::navigator::{Direction, navigate};

/// Default number of posts in the "top posts" list.
pub const DEFAULT_TOP_POSTS: usize = 5;

/// Ranges longer than this are charted in 7-day buckets.
pub const MAX_DAILY_POINTS: i64 = 366;

/// Follower count on the reference date; grows by a few dozen per day.
const FOLLOWER_BASE: f64 = 24_000.0;

/// Relative audience weight per platform, in [`Platform::ALL`] order.
const PLATFORM_WEIGHTS: [f64; 5] = [35.0, 25.0, 18.0, 12.0, 10.0];

const POST_TITLES: &[&str] = &[
    "Behind the scenes of our spring launch",
    "5 tips for planning a content calendar",
    "Customer spotlight: building in public",
    "Weekly recap and what's next",
    "Live Q&A highlights",
    "New feature walkthrough",
    "Team offsite photo dump",
    "Poll results are in",
    "How we doubled our newsletter signups",
    "Throwback to our first post",
    "Product roadmap sneak peek",
    "Community shout-outs",
];

/// Synthetic figures for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DayFigures {
    reach: u64,
    impressions: u64,
    engagements: u64,
    posts: u64,
    new_followers: u64,
}

impl DayFigures {
    fn add(&mut self, other: Self) {
        self.reach += other.reach;
        self.impressions += other.impressions;
        self.engagements += other.engagements;
        self.posts += other.posts;
        self.new_followers += other.new_followers;
    }
}

/// Mock-data generator. `salt` varies the synthetic universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    salt: u64,
    top_posts: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            salt: 0,
            top_posts: DEFAULT_TOP_POSTS,
        }
    }
}

/// Generate display data for `range` with the default generator.
#[must_use]
pub fn generate(range: &DateRange) -> DisplayData {
    Generator::default().generate(range)
}

impl Generator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    #[must_use]
    pub const fn with_top_posts(mut self, count: usize) -> Self {
        self.top_posts = count;
        self
    }

    /// Build every dashboard figure for `range`.
    #[must_use]
    pub fn generate(&self, range: &DateRange) -> DisplayData {
        let previous = navigate(range, Direction::Previous, range.end()).range();

        let current_totals = self.window_totals(range);
        let previous_totals = self.window_totals(&previous);
        let followers = self.followers_at(range.end().date());
        let previous_followers = self.followers_at(previous.end().date());

        let cards = CardKind::ALL
            .iter()
            .map(|&kind| {
                let (value, previous) = match kind {
                    CardKind::Followers => (followers, previous_followers),
                    CardKind::Engagement => (
                        engagement_rate(current_totals),
                        engagement_rate(previous_totals),
                    ),
                    CardKind::Reach => (
                        current_totals.reach as f64,
                        previous_totals.reach as f64,
                    ),
                    CardKind::Impressions => (
                        current_totals.impressions as f64,
                        previous_totals.impressions as f64,
                    ),
                    CardKind::Posts => (
                        current_totals.posts as f64,
                        previous_totals.posts as f64,
                    ),
                };
                StatCard {
                    kind,
                    value,
                    previous,
                }
            })
            .collect();

        DisplayData {
            range: *range,
            cards,
            series: self.series(range),
            platforms: self.platforms(range, followers),
            top_posts: self.top_posts(range),
        }
    }

    fn day_figures(&self, date: NaiveDate) -> DayFigures {
        let mut rng = StdRng::seed_from_u64(mix(self.salt, &[i64::from(date.num_days_from_ce())]));
        let weekday_factor: f64 = match date.weekday() {
            Weekday::Sat | Weekday::Sun => 0.75,
            _ => 1.0,
        };

        let reach = rng.random_range(1_500.0..3_000.0) * weekday_factor;
        let impressions = reach * rng.random_range(1.6..2.4);
        let engagements = impressions * rng.random_range(0.02..0.07);
        DayFigures {
            reach: reach.round() as u64,
            impressions: impressions.round() as u64,
            engagements: engagements.round() as u64,
            posts: rng.random_range(0..=3),
            new_followers: rng.random_range(5..=60),
        }
    }

    fn window_totals(&self, range: &DateRange) -> DayFigures {
        let mut totals = DayFigures::default();
        for date in range.calendar_days() {
            totals.add(self.day_figures(date));
        }
        totals
    }

    fn followers_at(&self, date: NaiveDate) -> f64 {
        let mut rng = StdRng::seed_from_u64(mix(self.salt, &[-i64::from(date.num_days_from_ce())]));
        let elapsed = f64::from(date.num_days_from_ce() - reference_date().num_days_from_ce());
        (FOLLOWER_BASE + elapsed * 32.0 + rng.random_range(0.0..400.0))
            .round()
            .max(0.0)
    }

    fn series(&self, range: &DateRange) -> Vec<SeriesPoint> {
        let bucket_days: u32 = if range.length_days() > MAX_DAILY_POINTS {
            7
        } else {
            1
        };

        let mut points: Vec<SeriesPoint> = Vec::new();
        for (index, date) in range.calendar_days().enumerate() {
            let figures = self.day_figures(date);
            let starts_bucket = index % bucket_days as usize == 0;
            match points.last_mut() {
                Some(point) if !starts_bucket => {
                    point.days += 1;
                    point.reach += figures.reach;
                    point.engagements += figures.engagements;
                }
                _ => points.push(SeriesPoint {
                    date,
                    days: 1,
                    reach: figures.reach,
                    engagements: figures.engagements,
                }),
            }
        }
        points
    }

    fn platforms(&self, range: &DateRange, followers: f64) -> Vec<PlatformShare> {
        let mut rng = self.window_rng(range, 1);
        let weights: Vec<f64> = PLATFORM_WEIGHTS
            .iter()
            .map(|w| w * rng.random_range(0.8..1.2))
            .collect();
        let total: f64 = weights.iter().sum();

        Platform::ALL
            .iter()
            .zip(weights)
            .map(|(&platform, weight)| {
                let share_pct = weight / total * 100.0;
                PlatformShare {
                    platform,
                    share_pct,
                    followers: (followers * share_pct / 100.0).round() as u64,
                }
            })
            .collect()
    }

    fn top_posts(&self, range: &DateRange) -> Vec<PostSummary> {
        let mut rng = self.window_rng(range, 2);
        let span_days = range.length_days().max(1);
        let first_day = range.start().date();
        let last_day = range.end().date();

        let mut posts: Vec<PostSummary> = (0..self.top_posts)
            .map(|_| {
                let offset = rng.random_range(0..span_days);
                let published = (first_day + TimeDelta::days(offset)).min(last_day);
                let platform = Platform::ALL[rng.random_range(0..Platform::ALL.len())];
                let likes = rng.random_range(120..4_000);
                PostSummary {
                    title: POST_TITLES[rng.random_range(0..POST_TITLES.len())].to_string(),
                    platform,
                    published,
                    likes,
                    comments: likes / rng.random_range(8..25),
                    shares: likes / rng.random_range(15..60),
                }
            })
            .collect();

        posts.sort_by(|a, b| {
            b.engagement()
                .cmp(&a.engagement())
                .then_with(|| a.published.cmp(&b.published))
        });
        posts
    }

    fn window_rng(&self, range: &DateRange, stream: i64) -> StdRng {
        StdRng::seed_from_u64(mix(
            self.salt,
            &[
                stream,
                range.start().and_utc().timestamp_millis(),
                range.end().and_utc().timestamp_millis(),
            ],
        ))
    }
}

fn engagement_rate(totals: DayFigures) -> f64 {
    if totals.impressions == 0 {
        return 0.0;
    }
    totals.engagements as f64 / totals.impressions as f64 * 100.0
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// FNV-1a over the salt and parts; stable across processes and releases.
fn mix(salt: u64, parts: &[i64]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let mut feed = |bytes: [u8; 8]| {
        for byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
    };
    feed(salt.to_le_bytes());
    for part in parts {
        feed(part.to_le_bytes());
    }
    hash
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn range(start: NaiveDateTime, end: NaiveDateTime) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    #[test]
    fn generation_is_deterministic() {
        let r = range(day(2024, 2, 14), day(2024, 3, 15));
        assert_eq!(generate(&r), generate(&r));
    }

    #[test]
    fn salt_changes_the_numbers() {
        let r = range(day(2024, 2, 14), day(2024, 3, 15));
        let a = Generator::new().generate(&r);
        let b = Generator::new().with_salt(42).generate(&r);
        assert_ne!(a.cards, b.cards);
    }

    #[test]
    fn one_card_per_kind_in_display_order() {
        let data = generate(&range(day(2024, 3, 1), day(2024, 3, 15)));
        let kinds: Vec<CardKind> = data.cards.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, CardKind::ALL.to_vec());
    }

    #[test]
    fn daily_series_has_one_point_per_calendar_day() {
        let r = range(day(2024, 3, 1), day(2024, 3, 15));
        let data = generate(&r);
        assert_eq!(data.series.len(), 15);
        assert!(data.series.iter().all(|p| p.days == 1));
        assert_eq!(data.series[0].date, r.start().date());
    }

    #[test]
    fn long_ranges_are_bucketed_weekly() {
        let r = range(day(2022, 1, 1), day(2024, 1, 1));
        let data = generate(&r);
        let total_days: u32 = data.series.iter().map(|p| p.days).sum();
        assert_eq!(i64::from(total_days), r.calendar_days().count() as i64);
        assert!(data.series.len() as i64 <= MAX_DAILY_POINTS);
        assert!(data.series.iter().all(|p| p.days <= 7));
    }

    #[test]
    fn reach_card_matches_series_sum() {
        let r = range(day(2024, 3, 1), day(2024, 3, 15));
        let data = generate(&r);
        let series_reach: u64 = data.series.iter().map(|p| p.reach).sum();
        let card = data.card(CardKind::Reach).unwrap();
        assert!((card.value - series_reach as f64).abs() < f64::EPSILON);
    }

    #[test]
    fn previous_value_is_the_preceding_window() {
        let r = range(day(2024, 3, 1), day(2024, 3, 15));
        let prev = range(day(2024, 2, 15), day(2024, 2, 29));
        let data = generate(&r);
        let prev_data = generate(&prev);
        assert_eq!(
            data.card(CardKind::Reach).unwrap().previous,
            prev_data.card(CardKind::Reach).unwrap().value
        );
    }

    #[test]
    fn platform_shares_sum_to_one_hundred() {
        let data = generate(&range(day(2024, 3, 1), day(2024, 3, 15)));
        let total: f64 = data.platforms.iter().map(|p| p.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-6, "total {total}");
        assert_eq!(data.platforms.len(), Platform::ALL.len());
    }

    #[test]
    fn top_posts_are_inside_range_and_sorted() {
        let r = range(day(2024, 3, 1), day(2024, 3, 15));
        let data = Generator::new().with_top_posts(8).generate(&r);
        assert_eq!(data.top_posts.len(), 8);
        for post in &data.top_posts {
            assert!(post.published >= r.start().date() && post.published <= r.end().date());
        }
        for pair in data.top_posts.windows(2) {
            assert!(pair[0].engagement() >= pair[1].engagement());
        }
    }

    #[test]
    fn engagement_rate_is_a_plausible_percentage() {
        let data = generate(&range(day(2024, 3, 1), day(2024, 3, 15)));
        let rate = data.card(CardKind::Engagement).unwrap().value;
        assert!((1.0..10.0).contains(&rate), "rate {rate}");
    }
}
