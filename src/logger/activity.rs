//! Typed activity events and the synchronous log that records them.

#![allow(missing_docs)]

use crate::core::config::Config;
use crate::core::errors::RbError;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::range::DateRange;
use crate::range::calendar::format_timestamp;
use crate::range::navigator::Navigation;
use crate::range::selector::PeriodSelector;

/// Events the dashboard and CLI report.
#[derive(Debug, Clone)]
pub enum ActivityEvent {
    DashboardStarted {
        version: String,
        config_hash: String,
    },
    DashboardStopped {
        uptime_secs: u64,
    },
    RangeSelected {
        selector: PeriodSelector,
        range: DateRange,
    },
    RangeNavigated {
        outcome: Navigation,
    },
    CustomRangeRejected {
        error: String,
        code: &'static str,
    },
    SelectorFallback {
        input: String,
        fallback: PeriodSelector,
    },
    ThemeSaved {
        path: String,
    },
    ThemeLoadFailed {
        path: String,
        details: String,
    },
}

impl ActivityEvent {
    /// Build a rejection event from the validation error.
    #[must_use]
    pub fn custom_range_rejected(error: &RbError) -> Self {
        Self::CustomRangeRejected {
            error: error.to_string(),
            code: error.code(),
        }
    }

    #[must_use]
    pub fn into_entry(self) -> LogEntry {
        match self {
            Self::DashboardStarted {
                version,
                config_hash,
            } => {
                let mut e = LogEntry::new(EventType::DashboardStart, Severity::Info);
                e.details = Some(format!("version={version} config_hash={config_hash}"));
                e
            }
            Self::DashboardStopped { uptime_secs } => {
                let mut e = LogEntry::new(EventType::DashboardStop, Severity::Info);
                e.details = Some(format!("uptime_secs={uptime_secs}"));
                e
            }
            Self::RangeSelected { selector, range } => {
                let mut e = LogEntry::new(EventType::RangeSelected, Severity::Info);
                e.selector = Some(selector.name());
                set_range(&mut e, &range);
                e
            }
            Self::RangeNavigated { outcome } => {
                let severity = if outcome.is_out_of_bounds() {
                    Severity::Warning
                } else {
                    Severity::Info
                };
                let mut e = LogEntry::new(EventType::RangeNavigated, severity);
                e.navigation = Some(outcome.kind().to_string());
                set_range(&mut e, &outcome.range());
                e
            }
            Self::CustomRangeRejected { error, code } => {
                let mut e = LogEntry::new(EventType::CustomRangeRejected, Severity::Warning);
                e.selector = Some("custom".to_string());
                e.error_code = Some(code.to_string());
                e.error_message = Some(error);
                e
            }
            Self::SelectorFallback { input, fallback } => {
                let mut e = LogEntry::new(EventType::SelectorFallback, Severity::Warning);
                e.selector = Some(fallback.name());
                e.details = Some(format!("unrecognized period {input:?}"));
                e
            }
            Self::ThemeSaved { path } => {
                let mut e = LogEntry::new(EventType::ThemeSaved, Severity::Info);
                e.details = Some(path);
                e
            }
            Self::ThemeLoadFailed { path, details } => {
                let mut e = LogEntry::new(EventType::ThemeLoadFailed, Severity::Warning);
                e.error_message = Some(details);
                e.details = Some(path);
                e
            }
        }
    }
}

fn set_range(entry: &mut LogEntry, range: &DateRange) {
    entry.range_start = Some(format_timestamp(range.start()));
    entry.range_end = Some(format_timestamp(range.end()));
}

/// Activity log handle. Disabled logs accept and drop every event.
pub struct ActivityLog {
    writer: Option<JsonlWriter>,
}

impl ActivityLog {
    /// Open the log described by `config`, or a disabled log when
    /// `logging.enabled` is false.
    #[must_use]
    pub fn open(config: &Config) -> Self {
        if !config.logging.enabled {
            return Self::disabled();
        }
        Self::with_writer(JsonlWriter::open(JsonlConfig::from_config(
            &config.logging,
            &config.paths,
        )))
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self { writer: None }
    }

    #[must_use]
    pub const fn with_writer(writer: JsonlWriter) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record(&mut self, event: ActivityEvent) {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_entry(&event.into_entry());
        }
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush();
        }
    }
}
