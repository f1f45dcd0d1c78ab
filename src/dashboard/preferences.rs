//! Persisted theme settings with safe atomic persistence.
//!
//! The dashboard remembers light/dark mode, accent colour, skin and content
//! width across sessions. Persistence failures never block startup or
//! rendering: a missing or damaged file just means compiled defaults.
//!
//! # Merge Order
//!
//! ```text
//! compiled defaults → persisted settings → CLI/session overrides
//! ```
//!
//! # Persistence Strategy
//!
//! Atomic write: serialize → temp file → fsync → rename over target.
//! Debounce coalesces rapid toggling into a single write.

use std::fmt;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::theme::{PrimaryColor, ThemeMode};

/// Current schema version. Additive fields rely on `#[serde(default)]`.
const SCHEMA_VERSION: u32 = 1;

/// Minimum debounce interval between persisted writes.
const WRITE_DEBOUNCE: Duration = Duration::from_secs(2);

// ──────────────────── settings ────────────────────

/// Persisted theme settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    /// Schema version for migration detection.
    pub schema_version: u32,
    pub mode: ThemeMode,
    pub primary_color: PrimaryColor,
    pub skin: Skin,
    pub content_width: ContentWidth,
    /// Darkened headings on an otherwise light theme.
    pub semi_dark: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            mode: ThemeMode::default(),
            primary_color: PrimaryColor::default(),
            skin: Skin::default(),
            content_width: ContentWidth::default(),
            semi_dark: false,
        }
    }
}

/// Card decoration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skin {
    #[default]
    Default,
    /// Cards drawn inside box borders.
    Bordered,
}

/// Column budget for the dashboard body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentWidth {
    /// Capped at a fixed width and centred.
    #[default]
    Compact,
    /// Use the whole terminal.
    Wide,
}

impl ContentWidth {
    /// Columns to lay out in, given the terminal width.
    #[must_use]
    pub fn columns(self, terminal_cols: u16) -> u16 {
        match self {
            Self::Compact => terminal_cols.min(100),
            Self::Wide => terminal_cols,
        }
    }
}

impl fmt::Display for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Bordered => write!(f, "bordered"),
        }
    }
}

impl fmt::Display for ContentWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compact => write!(f, "compact"),
            Self::Wide => write!(f, "wide"),
        }
    }
}

impl FromStr for Skin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "bordered" => Ok(Self::Bordered),
            other => Err(format!("unknown skin {other:?} (expected default|bordered)")),
        }
    }
}

impl FromStr for ContentWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "wide" => Ok(Self::Wide),
            other => Err(format!("unknown content width {other:?} (expected compact|wide)")),
        }
    }
}

impl ThemeSettings {
    /// Set one field from its `theme set` key. Unknown keys and bad values
    /// leave the settings untouched.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "mode" => self.mode = value.parse()?,
            "primary_color" | "primary-color" | "color" => self.primary_color = value.parse()?,
            "skin" => self.skin = value.parse()?,
            "content_width" | "content-width" | "width" => self.content_width = value.parse()?,
            "semi_dark" | "semi-dark" => {
                self.semi_dark = value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| format!("semi_dark expects true|false: {e}"))?;
            }
            other => {
                return Err(format!(
                    "unknown theme key {other:?} (expected mode|primary_color|skin|content_width|semi_dark)"
                ));
            }
        }
        Ok(())
    }
}

// ──────────────────── validation ────────────────────

/// Validation result for loaded settings.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validate loaded settings. Returns the (possibly patched) settings and a
/// report of any issues found.
pub fn validate(mut settings: ThemeSettings) -> (ThemeSettings, ValidationReport) {
    let mut report = ValidationReport::default();

    if settings.schema_version > SCHEMA_VERSION {
        report.warnings.push(format!(
            "theme schema version {} is newer than supported {}; \
             unknown fields will be ignored",
            settings.schema_version, SCHEMA_VERSION,
        ));
    }

    if settings.semi_dark && settings.mode == ThemeMode::Dark {
        report
            .warnings
            .push("semi_dark has no effect in dark mode; cleared".to_string());
        settings.semi_dark = false;
    }

    (settings, report)
}

// ──────────────────── persistence ────────────────────

/// Load outcome from the persistence layer.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        settings: ThemeSettings,
        report: ValidationReport,
    },
    /// File not found (normal for first launch).
    Missing,
    /// File exists but is unparseable.
    Corrupt { details: String },
    IoError { details: String },
}

impl LoadOutcome {
    /// Effective settings regardless of load status.
    #[must_use]
    pub fn into_settings(self) -> ThemeSettings {
        match self {
            Self::Loaded { settings, .. } => settings,
            Self::Missing | Self::Corrupt { .. } | Self::IoError { .. } => {
                ThemeSettings::default()
            }
        }
    }

    /// Loaded, or first-launch missing.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::Missing)
    }

    /// Failure details for logging, if the load failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Corrupt { details } | Self::IoError { details } => Some(details),
            Self::Loaded { .. } | Self::Missing => None,
        }
    }
}

/// Load settings from a file path. Never panics, never fails hard.
pub fn load(path: &Path) -> LoadOutcome {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return LoadOutcome::Missing,
        // Invalid UTF-8 is corrupt content, not an I/O error.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return LoadOutcome::Corrupt {
                details: format!("{e}"),
            };
        }
        Err(e) => {
            return LoadOutcome::IoError {
                details: format!("{e}"),
            };
        }
    };

    let settings: ThemeSettings = match serde_json::from_str(&content) {
        Ok(s) => s,
        Err(e) => {
            return LoadOutcome::Corrupt {
                details: format!("{e}"),
            };
        }
    };

    let (settings, report) = validate(settings);
    LoadOutcome::Loaded { settings, report }
}

/// Atomic save: serialize → temp file → fsync → rename.
///
/// Creates parent directories as needed. Returns the path written.
pub fn save(settings: &ThemeSettings, path: &Path) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(path.to_path_buf())
}

// ──────────────────── debounced writer ────────────────────

/// Debounced writer that limits persistence frequency.
pub struct DebouncedWriter {
    path: PathBuf,
    debounce: Duration,
    last_write: Option<Instant>,
    pending: bool,
}

impl DebouncedWriter {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            debounce: WRITE_DEBOUNCE,
            last_write: None,
            pending: false,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, d: Duration) -> Self {
        self.debounce = d;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark that settings changed and should be persisted.
    pub fn request_save(&mut self) {
        self.pending = true;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Write if something is pending and the debounce interval elapsed.
    /// `None` means nothing was written.
    pub fn try_flush(&mut self, settings: &ThemeSettings) -> Option<io::Result<PathBuf>> {
        if !self.pending {
            return None;
        }

        let now = Instant::now();
        if let Some(last) = self.last_write
            && now.duration_since(last) < self.debounce
        {
            return None;
        }

        self.pending = false;
        self.last_write = Some(now);
        Some(save(settings, &self.path))
    }

    /// Write immediately, bypassing debounce. Used on shutdown.
    pub fn force_flush(&mut self, settings: &ThemeSettings) -> Option<io::Result<PathBuf>> {
        if !self.pending {
            return None;
        }

        self.pending = false;
        self.last_write = Some(Instant::now());
        Some(save(settings, &self.path))
    }
}

// ──────────────────── merge ────────────────────

/// Session overrides from CLI flags. Never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOverrides {
    pub mode: Option<ThemeMode>,
    pub primary_color: Option<PrimaryColor>,
}

/// Effective settings for this session: overrides win over persisted.
#[must_use]
pub fn merge(persisted: &ThemeSettings, overrides: &SessionOverrides) -> ThemeSettings {
    ThemeSettings {
        mode: overrides.mode.unwrap_or(persisted.mode),
        primary_color: overrides.primary_color.unwrap_or(persisted.primary_color),
        ..*persisted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_light_indigo() {
        let s = ThemeSettings::default();
        assert_eq!(s.schema_version, SCHEMA_VERSION);
        assert_eq!(s.mode, ThemeMode::Light);
        assert_eq!(s.primary_color, PrimaryColor::Indigo);
        assert_eq!(s.skin, Skin::Default);
        assert_eq!(s.content_width, ContentWidth::Compact);
        assert!(!s.semi_dark);
    }

    #[test]
    fn deserialize_partial_object_fills_defaults() {
        let back: ThemeSettings = serde_json::from_str(r#"{"mode": "dark"}"#).unwrap();
        assert_eq!(back.mode, ThemeMode::Dark);
        assert_eq!(back.primary_color, PrimaryColor::Indigo);
    }

    #[test]
    fn unknown_fields_ignored() {
        let back: ThemeSettings =
            serde_json::from_str(r#"{"skin": "bordered", "future_field": 42}"#).unwrap();
        assert_eq!(back.skin, Skin::Bordered);
    }

    #[test]
    fn validation_warns_on_future_schema() {
        let s = ThemeSettings {
            schema_version: 999,
            ..Default::default()
        };
        let (_, report) = validate(s);
        assert!(report.warnings.iter().any(|w| w.contains("newer")));
    }

    #[test]
    fn validation_clears_semi_dark_in_dark_mode() {
        let s = ThemeSettings {
            mode: ThemeMode::Dark,
            semi_dark: true,
            ..Default::default()
        };
        let (fixed, report) = validate(s);
        assert!(!fixed.semi_dark);
        assert!(!report.is_clean());
    }

    #[test]
    fn set_field_accepts_known_keys() {
        let mut s = ThemeSettings::default();
        s.set_field("mode", "dark").unwrap();
        s.set_field("primary-color", "rose").unwrap();
        s.set_field("width", "wide").unwrap();
        s.set_field("semi_dark", "true").unwrap();
        assert_eq!(s.mode, ThemeMode::Dark);
        assert_eq!(s.primary_color, PrimaryColor::Rose);
        assert_eq!(s.content_width, ContentWidth::Wide);
        assert!(s.semi_dark);
    }

    #[test]
    fn set_field_rejects_unknown_key_and_bad_value() {
        let mut s = ThemeSettings::default();
        assert!(s.set_field("font", "mono").is_err());
        assert!(s.set_field("skin", "fancy").is_err());
        assert_eq!(s, ThemeSettings::default());
    }

    #[test]
    fn merge_override_wins() {
        let persisted = ThemeSettings {
            skin: Skin::Bordered,
            ..Default::default()
        };
        let merged = merge(
            &persisted,
            &SessionOverrides {
                mode: Some(ThemeMode::Dark),
                ..Default::default()
            },
        );
        assert_eq!(merged.mode, ThemeMode::Dark);
        assert_eq!(merged.skin, Skin::Bordered);
        assert_eq!(merged.primary_color, persisted.primary_color);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        let s = ThemeSettings {
            mode: ThemeMode::Dark,
            primary_color: PrimaryColor::Teal,
            ..Default::default()
        };

        save(&s, &path).unwrap();
        match load(&path) {
            LoadOutcome::Loaded { settings, report } => {
                assert_eq!(settings, s);
                assert!(report.is_clean());
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn load_missing_file_returns_missing() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load(&dir.path().join("absent.json"));
        assert!(matches!(outcome, LoadOutcome::Missing));
        assert!(outcome.is_ok());
    }

    #[test]
    fn load_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        fs::write(&path, "not valid json {{{").unwrap();
        let outcome = load(&path);
        assert!(matches!(outcome, LoadOutcome::Corrupt { .. }));
        assert!(outcome.failure().is_some());
        assert_eq!(outcome.into_settings(), ThemeSettings::default());
    }

    #[test]
    fn save_creates_parent_dirs_without_tmp_leftover() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("theme.json");
        save(&ThemeSettings::default(), &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn debounced_writer_respects_debounce() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        let mut writer = DebouncedWriter::new(path).with_debounce(Duration::from_secs(60));
        let s = ThemeSettings::default();

        assert!(writer.try_flush(&s).is_none());

        writer.request_save();
        assert!(writer.try_flush(&s).is_some());

        writer.request_save();
        assert!(writer.try_flush(&s).is_none());
        assert!(writer.is_pending());

        assert!(writer.force_flush(&s).is_some());
        assert!(!writer.is_pending());
    }

    #[test]
    fn content_width_caps_compact_layout() {
        assert_eq!(ContentWidth::Compact.columns(200), 100);
        assert_eq!(ContentWidth::Compact.columns(80), 80);
        assert_eq!(ContentWidth::Wide.columns(200), 200);
    }
}
