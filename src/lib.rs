#![forbid(unsafe_code)]

//! reachboard: a social-media analytics dashboard built around a date-range
//! core.
//!
//! The interesting part is [`range`]: symbolic period presets resolve to
//! concrete ranges anchored at "now", ranges page backward and forward by
//! their own length without ever running past today, and custom pairs are
//! validated before they are accepted. [`metrics`] fabricates deterministic
//! display data for any range, and [`dashboard`] renders it.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use reachboard::prelude::*;
//!
//! let now = SystemClock.now();
//! let range = resolve(&PeriodSelector::ThisMonth, now);
//! println!("{}", format_label(&range));
//! ```

pub mod prelude;

pub mod core;
#[cfg(feature = "cli")]
pub mod dashboard;
pub mod logger;
pub mod metrics;
pub mod range;
