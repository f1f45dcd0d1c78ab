//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use reachboard::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{RangeViolation, RbError, Result};

// Range
pub use crate::range::label::{format_label, format_label_with_year};
pub use crate::range::navigator::{Direction, Navigation, can_navigate_next, navigate};
pub use crate::range::resolver::resolve;
pub use crate::range::selector::PeriodSelector;
pub use crate::range::validation::validate_custom;
pub use crate::range::{Clock, DateRange, FixedClock, SystemClock};

// Metrics
pub use crate::metrics::{DisplayData, Generator, generate};

// Dashboard
#[cfg(feature = "cli")]
pub use crate::dashboard::state::DashboardState;

// Logging
pub use crate::logger::activity::{ActivityEvent, ActivityLog};
