//! Synthetic analytics figures for a date range.
//!
//! Nothing here reads real data. [`generate`] turns a [`DateRange`] into the
//! cards, chart series, platform split and post list the dashboard shows.
//! Output is a pure function of the range (and the generator salt), so
//! re-rendering the same range always shows the same numbers.

#![allow(missing_docs)]

pub mod format;
pub mod generator;

use chrono::NaiveDate;
use serde::Serialize;

use crate::range::DateRange;

pub use self::generator::{Generator, generate};

/// Which headline metric a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Followers,
    Engagement,
    Reach,
    Impressions,
    Posts,
}

impl CardKind {
    /// Display order on the dashboard.
    pub const ALL: [Self; 5] = [
        Self::Followers,
        Self::Engagement,
        Self::Reach,
        Self::Impressions,
        Self::Posts,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Followers => "Followers",
            Self::Engagement => "Engagement",
            Self::Reach => "Reach",
            Self::Impressions => "Impressions",
            Self::Posts => "Posts",
        }
    }
}

/// One headline statistic compared against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatCard {
    pub kind: CardKind,
    pub value: f64,
    /// Same metric over the immediately preceding window of equal length.
    pub previous: f64,
}

impl StatCard {
    /// Relative change versus the previous period, in percent. `None` when
    /// there is nothing to compare against.
    #[must_use]
    pub fn change_pct(&self) -> Option<f64> {
        if self.previous.abs() < f64::EPSILON {
            return None;
        }
        Some((self.value - self.previous) / self.previous * 100.0)
    }

    /// Value formatted for the card body.
    #[must_use]
    pub fn display_value(&self) -> String {
        match self.kind {
            CardKind::Engagement => format::percent(self.value),
            _ => format::compact_number(self.value),
        }
    }
}

/// One point of the reach/engagement chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// First calendar day covered by the point.
    pub date: NaiveDate,
    /// Number of calendar days aggregated into the point (1 or 7).
    pub days: u32,
    pub reach: u64,
    pub engagements: u64,
}

/// Social network a post or audience share belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    X,
    LinkedIn,
    TikTok,
}

impl Platform {
    pub const ALL: [Self; 5] = [
        Self::Instagram,
        Self::Facebook,
        Self::X,
        Self::LinkedIn,
        Self::TikTok,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::X => "X",
            Self::LinkedIn => "LinkedIn",
            Self::TikTok => "TikTok",
        }
    }
}

/// Audience split per platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlatformShare {
    pub platform: Platform,
    /// Percent of total followers; shares sum to 100.
    pub share_pct: f64,
    pub followers: u64,
}

/// A top-performing post inside the range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub platform: Platform,
    pub published: NaiveDate,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl PostSummary {
    #[must_use]
    pub const fn engagement(&self) -> u64 {
        self.likes + self.comments + self.shares
    }
}

/// Everything the dashboard renders for one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayData {
    pub range: DateRange,
    pub cards: Vec<StatCard>,
    pub series: Vec<SeriesPoint>,
    pub platforms: Vec<PlatformShare>,
    pub top_posts: Vec<PostSummary>,
}

impl DisplayData {
    #[must_use]
    pub fn card(&self, kind: CardKind) -> Option<&StatCard> {
        self.cards.iter().find(|c| c.kind == kind)
    }
}
