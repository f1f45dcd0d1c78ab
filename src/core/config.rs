//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{RbError, Result};
use crate::range::selector::PeriodSelector;

/// Full reachboard configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub generator: GeneratorConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

/// Dashboard defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Period selected on startup and when none is given on the command line.
    pub default_period: String,
    /// Reject unrecognized period names instead of falling back to 30 days.
    pub strict_selectors: bool,
    /// Input poll interval of the interactive dashboard.
    pub refresh_ms: u64,
    /// Length of the "top posts" list.
    pub top_posts: usize,
}

/// Mock-data generator knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Varies the synthetic numbers; the same salt always yields the same data.
    pub salt: u64,
}

/// Filesystem paths used by reachboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub theme_file: PathBuf,
    pub activity_log: PathBuf,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_period: "30days".to_string(),
            strict_selectors: false,
            refresh_ms: 250,
            top_posts: 5,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!("[RB-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("reachboard");
        let data = home_dir.join(".local").join("share").join("reachboard");
        Self {
            config_file: cfg.join("config.toml"),
            theme_file: cfg.join("theme.json"),
            activity_log: data.join("activity.jsonl"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// A missing file at the default path is not an error; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| RbError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(RbError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for diagnostics.
    ///
    /// FNV-1a, so the value is stable across processes and Rust releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// The configured startup period.
    pub fn default_selector(&self) -> Result<PeriodSelector> {
        self.dashboard.default_period.parse()
    }

    /// Render the effective config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // dashboard
        if let Some(raw) = lookup("RB_DASHBOARD_DEFAULT_PERIOD") {
            self.dashboard.default_period = raw.trim().to_string();
        }
        if let Some(raw) = lookup("RB_DASHBOARD_STRICT_SELECTORS") {
            self.dashboard.strict_selectors = parse_env("RB_DASHBOARD_STRICT_SELECTORS", &raw)?;
        }
        if let Some(raw) = lookup("RB_DASHBOARD_REFRESH_MS") {
            self.dashboard.refresh_ms = parse_env("RB_DASHBOARD_REFRESH_MS", &raw)?;
        }
        if let Some(raw) = lookup("RB_DASHBOARD_TOP_POSTS") {
            self.dashboard.top_posts = parse_env("RB_DASHBOARD_TOP_POSTS", &raw)?;
        }

        // generator
        if let Some(raw) = lookup("RB_GENERATOR_SALT") {
            self.generator.salt = parse_env("RB_GENERATOR_SALT", &raw)?;
        }

        // paths
        if let Some(raw) = lookup("RB_THEME_FILE") {
            self.paths.theme_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("RB_ACTIVITY_LOG") {
            self.paths.activity_log = PathBuf::from(raw);
        }

        // logging
        if let Some(raw) = lookup("RB_LOGGING_ENABLED") {
            self.logging.enabled = parse_env("RB_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("RB_LOGGING_MAX_SIZE_BYTES") {
            self.logging.max_size_bytes = parse_env("RB_LOGGING_MAX_SIZE_BYTES", &raw)?;
        }
        if let Some(raw) = lookup("RB_LOGGING_MAX_ROTATED_FILES") {
            self.logging.max_rotated_files = parse_env("RB_LOGGING_MAX_ROTATED_FILES", &raw)?;
        }

        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.default_selector().is_err() {
            return Err(RbError::InvalidConfig {
                details: format!(
                    "dashboard.default_period {:?} is not a known period \
                     (try 7days, 30days, today, thisMonth, lastMonth, thisYear)",
                    self.dashboard.default_period
                ),
            });
        }

        if !(16..=10_000).contains(&self.dashboard.refresh_ms) {
            return Err(RbError::InvalidConfig {
                details: format!(
                    "dashboard.refresh_ms must be in [16, 10000], got {}",
                    self.dashboard.refresh_ms
                ),
            });
        }

        if !(1..=50).contains(&self.dashboard.top_posts) {
            return Err(RbError::InvalidConfig {
                details: format!(
                    "dashboard.top_posts must be in [1, 50], got {}",
                    self.dashboard.top_posts
                ),
            });
        }

        if self.logging.enabled && self.logging.max_size_bytes < 1024 {
            return Err(RbError::InvalidConfig {
                details: format!(
                    "logging.max_size_bytes must be at least 1024, got {}",
                    self.logging.max_size_bytes
                ),
            });
        }

        if self.logging.max_rotated_files > 20 {
            return Err(RbError::InvalidConfig {
                details: format!(
                    "logging.max_rotated_files must be at most 20, got {}",
                    self.logging.max_rotated_files
                ),
            });
        }

        if self.paths.theme_file.as_os_str().is_empty() {
            return Err(RbError::InvalidConfig {
                details: "paths.theme_file must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| RbError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
