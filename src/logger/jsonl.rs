//! JSONL logger: append-only line-delimited JSON activity log.
//!
//! Each line is a self-contained JSON object, assembled in memory and written
//! with one `write_all` so a concurrent `tail -f` never sees a partial line.
//!
//! Four-level fallback chain:
//! 1. Primary file path
//! 2. Fallback path (temp dir by default)
//! 3. stderr with `[RB-JSONL]` prefix
//! 4. Silent discard (the dashboard must never fail because of logging)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::config::{LoggingConfig, PathsConfig};
use crate::core::errors::{RbError, Result};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// Log event types of the reachboard activity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DashboardStart,
    DashboardStop,
    RangeSelected,
    RangeNavigated,
    CustomRangeRejected,
    SelectorFallback,
    ThemeSaved,
    ThemeLoadFailed,
}

/// A single JSONL log entry. Only `ts`, `event` and `severity` are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// Selector name (`30days`, `thisMonth`, `custom`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Range start, local wall-clock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_start: Option<String>,
    /// Range end, local wall-clock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_end: Option<String>,
    /// Paging outcome: `moved`, `clamped` or `forward_disabled`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<String>,
    /// RB error code if the action failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Freeform details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            selector: None,
            range_start: None,
            range_end: None,
            navigation: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }
}

/// Where the writer currently sends lines. Only ever moves down the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Primary,
    Fallback,
    Stderr,
    Discard,
}

impl WriterState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
            Self::Stderr => "stderr",
            Self::Discard => "discard",
        }
    }

    const fn is_file(self) -> bool {
        matches!(self, Self::Primary | Self::Fallback)
    }
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    /// Used when `path` cannot be opened or written.
    pub fallback_path: Option<PathBuf>,
    /// Rotate once the active file would grow past this many bytes.
    pub max_size_bytes: u64,
    /// Rotated generations kept as `<path>.1` .. `<path>.N`.
    pub max_rotated_files: u32,
    pub fsync_interval: Duration,
}

impl JsonlConfig {
    /// Writer settings from the `[logging]` and `[paths]` config sections.
    #[must_use]
    pub fn from_config(logging: &LoggingConfig, paths: &PathsConfig) -> Self {
        Self {
            path: paths.activity_log.clone(),
            fallback_path: Some(std::env::temp_dir().join("reachboard-activity.jsonl")),
            max_size_bytes: logging.max_size_bytes,
            max_rotated_files: logging.max_rotated_files,
            fsync_interval: Duration::from_secs(10),
        }
    }

    fn target(&self, state: WriterState) -> Option<&Path> {
        match state {
            WriterState::Primary => Some(&self.path),
            WriterState::Fallback => self.fallback_path.as_deref(),
            WriterState::Stderr | WriterState::Discard => None,
        }
    }
}

/// Open file plus the bytes it already holds.
struct Sink {
    out: BufWriter<File>,
    len: u64,
}

impl Sink {
    fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RbError::io(parent, source))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| RbError::io(path, source))?;
        let len = file.metadata().map_or(0, |m| m.len());
        Ok(Self {
            out: BufWriter::with_capacity(16 * 1024, file),
            len,
        })
    }
}

/// Append-only JSONL writer: size rotation, then primary → fallback →
/// stderr → discard on failure.
pub struct JsonlWriter {
    config: JsonlConfig,
    sink: Option<Sink>,
    state: WriterState,
    last_fsync: Instant,
}

impl JsonlWriter {
    /// Open the first usable target. Never fails; a writer that cannot open
    /// any file reports to stderr instead.
    pub fn open(config: JsonlConfig) -> Self {
        let mut writer = Self {
            config,
            sink: None,
            state: WriterState::Primary,
            last_fsync: Instant::now(),
        };
        writer.settle(WriterState::Primary);
        writer
    }

    /// Serialize `entry` and append it as one line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        match serde_json::to_string(entry) {
            Ok(mut line) => {
                line.push('\n');
                self.append(&line);
            }
            Err(e) => {
                let _ = writeln!(io::stderr(), "[RB-JSONL] cannot serialize {:?}: {e}", entry.event);
            }
        }
    }

    pub fn flush(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            let _ = sink.out.flush();
        }
    }

    /// Flush and sync file data to disk.
    pub fn fsync(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            let _ = sink.out.flush();
            let _ = sink.out.get_ref().sync_data();
        }
        self.last_fsync = Instant::now();
    }

    #[must_use]
    pub const fn state(&self) -> WriterState {
        self.state
    }

    // ──────────────────────── internals ────────────────────────

    /// Walk down the chain from `from` until a target opens.
    fn settle(&mut self, from: WriterState) {
        let mut state = from;
        loop {
            if !state.is_file() {
                self.sink = None;
                self.state = state;
                return;
            }
            if let Some(path) = self.config.target(state) {
                match Sink::open(path) {
                    Ok(sink) => {
                        if state != from {
                            let _ = writeln!(
                                io::stderr(),
                                "[RB-JSONL] activity log moved to {}",
                                path.display()
                            );
                        }
                        self.sink = Some(sink);
                        self.state = state;
                        return;
                    }
                    Err(e) => {
                        let _ = writeln!(io::stderr(), "[RB-JSONL] {e}");
                    }
                }
            }
            state = next_down(state);
            if state == WriterState::Stderr {
                let _ = writeln!(io::stderr(), "[RB-JSONL] no writable log file, using stderr");
            }
        }
    }

    fn append(&mut self, line: &str) {
        let len = line.len() as u64;
        if self.state.is_file()
            && self
                .sink
                .as_ref()
                .is_some_and(|sink| sink.len > 0 && sink.len + len > self.config.max_size_bytes)
        {
            self.rotate();
        }

        loop {
            match self.state {
                WriterState::Primary | WriterState::Fallback => {
                    let written = self
                        .sink
                        .as_mut()
                        .is_some_and(|sink| sink.out.write_all(line.as_bytes()).is_ok());
                    if written {
                        if let Some(sink) = self.sink.as_mut() {
                            sink.len += len;
                        }
                        if self.last_fsync.elapsed() >= self.config.fsync_interval {
                            self.fsync();
                        }
                        return;
                    }
                    self.settle(next_down(self.state));
                }
                WriterState::Stderr => {
                    if write!(io::stderr(), "[RB-JSONL] {line}").is_err() {
                        self.state = WriterState::Discard;
                    }
                    return;
                }
                WriterState::Discard => return,
            }
        }
    }

    /// `<path>.N-1` → `<path>.N` … `<path>` → `<path>.1`, then reopen.
    fn rotate(&mut self) {
        self.flush();
        self.sink = None;
        let Some(base) = self.config.target(self.state).map(Path::to_path_buf) else {
            return;
        };

        let keep = self.config.max_rotated_files;
        if keep == 0 {
            let _ = fs::remove_file(&base);
        } else {
            for generation in (1..keep).rev() {
                let _ = fs::rename(rotated_name(&base, generation), rotated_name(&base, generation + 1));
            }
            let _ = fs::rename(&base, rotated_name(&base, 1));
        }

        match Sink::open(&base) {
            Ok(sink) => self.sink = Some(sink),
            Err(_) => self.settle(next_down(self.state)),
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

const fn next_down(state: WriterState) -> WriterState {
    match state {
        WriterState::Primary => WriterState::Fallback,
        WriterState::Fallback => WriterState::Stderr,
        WriterState::Stderr | WriterState::Discard => WriterState::Discard,
    }
}

/// `activity.jsonl` → `activity.jsonl.3`.
fn rotated_name(base: &Path, generation: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{generation}"));
    PathBuf::from(name)
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: PathBuf, max_size_bytes: u64) -> JsonlConfig {
        JsonlConfig {
            path,
            fallback_path: None,
            max_size_bytes,
            max_rotated_files: 3,
            fsync_interval: Duration::from_secs(60),
        }
    }

    #[test]
    fn write_entry_produces_valid_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.jsonl");
        let mut writer = JsonlWriter::open(config(path.clone(), 1024 * 1024));

        let mut entry = LogEntry::new(EventType::RangeSelected, Severity::Info);
        entry.selector = Some("30days".to_string());
        writer.write_entry(&entry);
        writer.flush();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["event"], "range_selected");
        assert_eq!(parsed["severity"], "info");
        assert_eq!(parsed["selector"], "30days");
    }

    #[test]
    fn entry_optional_fields_omitted_when_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.jsonl");
        let mut writer = JsonlWriter::open(config(path.clone(), 1024 * 1024));
        writer.write_entry(&LogEntry::new(EventType::DashboardStart, Severity::Info));
        writer.flush();

        let line = fs::read_to_string(&path).unwrap();
        assert!(!line.contains("\"range_start\""));
        assert!(!line.contains("\"navigation\""));
        assert!(!line.contains("\"error_code\""));
    }

    #[test]
    fn rotation_shifts_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot.jsonl");
        let mut writer = JsonlWriter::open(config(path.clone(), 100));

        for _ in 0..10 {
            writer.write_entry(&LogEntry::new(EventType::RangeNavigated, Severity::Info));
        }
        writer.flush();

        assert!(path.exists());
        assert!(rotated_name(&path, 1).exists());
        assert!(!rotated_name(&path, 4).exists());
    }

    #[test]
    fn fallback_when_primary_dir_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let fallback = dir.path().join("fallback.jsonl");
        let mut cfg = config(blocker.join("primary.jsonl"), 1024 * 1024);
        cfg.fallback_path = Some(fallback.clone());
        let mut writer = JsonlWriter::open(cfg);

        assert_eq!(writer.state(), WriterState::Fallback);
        writer.write_entry(&LogEntry::new(EventType::ThemeLoadFailed, Severity::Warning));
        writer.flush();

        assert!(!fs::read_to_string(&fallback).unwrap().is_empty());
    }

    #[test]
    fn stderr_when_no_fallback_configured() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let writer = JsonlWriter::open(config(blocker.join("primary.jsonl"), 1024));
        assert_eq!(writer.state(), WriterState::Stderr);
    }

    #[test]
    fn config_sections_map_onto_writer_settings() {
        let logging = LoggingConfig {
            enabled: true,
            max_size_bytes: 4096,
            max_rotated_files: 2,
        };
        let paths = PathsConfig {
            activity_log: PathBuf::from("/tmp/rb/activity.jsonl"),
            ..PathsConfig::default()
        };
        let cfg = JsonlConfig::from_config(&logging, &paths);
        assert_eq!(cfg.path, PathBuf::from("/tmp/rb/activity.jsonl"));
        assert_eq!(cfg.max_size_bytes, 4096);
        assert_eq!(cfg.max_rotated_files, 2);
        assert!(cfg.fallback_path.is_some());
    }
}
