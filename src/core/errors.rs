//! RB-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, RbError>;

/// Why a candidate date range was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// `start` is later than `end`.
    EndBeforeStart,
    /// `end` is later than the reference "now".
    EndInFuture,
}

impl std::fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndBeforeStart => write!(f, "end is before start"),
            Self::EndInFuture => write!(f, "end is later than now"),
        }
    }
}

/// Top-level error type for reachboard.
#[derive(Debug, Error)]
pub enum RbError {
    #[error("[RB-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[RB-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[RB-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[RB-2001] unknown period selector: {name:?}")]
    UnknownSelector { name: String },

    #[error("[RB-2002] invalid date range {start} .. {end}: {violation}")]
    InvalidRange {
        start: String,
        end: String,
        violation: RangeViolation,
    },

    #[error("[RB-2003] cannot parse timestamp {input:?}: {details}")]
    TimestampParse { input: String, details: String },

    #[error("[RB-2004] cannot page {start} .. {end} further: the result leaves the supported calendar")]
    RangeOutOfBounds { start: String, end: String },

    #[error("[RB-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[RB-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RbError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "RB-1001",
            Self::MissingConfig { .. } => "RB-1002",
            Self::ConfigParse { .. } => "RB-1003",
            Self::UnknownSelector { .. } => "RB-2001",
            Self::InvalidRange { .. } => "RB-2002",
            Self::TimestampParse { .. } => "RB-2003",
            Self::RangeOutOfBounds { .. } => "RB-2004",
            Self::Serialization { .. } => "RB-2101",
            Self::Io { .. } => "RB-3002",
        }
    }

    /// Whether the failure was caused by caller input rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownSelector { .. }
                | Self::InvalidRange { .. }
                | Self::TimestampParse { .. }
                | Self::RangeOutOfBounds { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for RbError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for RbError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RbError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<RbError> {
        vec![
            RbError::InvalidConfig {
                details: String::new(),
            },
            RbError::MissingConfig {
                path: PathBuf::new(),
            },
            RbError::ConfigParse {
                context: "",
                details: String::new(),
            },
            RbError::UnknownSelector {
                name: String::new(),
            },
            RbError::InvalidRange {
                start: String::new(),
                end: String::new(),
                violation: RangeViolation::EndBeforeStart,
            },
            RbError::TimestampParse {
                input: String::new(),
                details: String::new(),
            },
            RbError::RangeOutOfBounds {
                start: String::new(),
                end: String::new(),
            },
            RbError::Serialization {
                context: "",
                details: String::new(),
            },
            RbError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = all_variants();
        let codes: Vec<&str> = errors.iter().map(RbError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_rb_prefix() {
        for err in &all_variants() {
            assert!(
                err.code().starts_with("RB-"),
                "code {} must start with RB-",
                err.code()
            );
        }
    }

    #[test]
    fn display_includes_code_and_violation() {
        let err = RbError::InvalidRange {
            start: "2024-05-10".to_string(),
            end: "2024-05-01".to_string(),
            violation: RangeViolation::EndBeforeStart,
        };
        let msg = err.to_string();
        assert!(msg.contains("RB-2002"), "missing code: {msg}");
        assert!(msg.contains("end is before start"), "missing reason: {msg}");
    }

    #[test]
    fn user_errors_are_classified() {
        assert!(
            RbError::UnknownSelector {
                name: "30dayz".to_string()
            }
            .is_user_error()
        );
        assert!(
            !RbError::InvalidConfig {
                details: String::new()
            }
            .is_user_error()
        );
        assert!(!RbError::io("/tmp/x", std::io::Error::other("gone")).is_user_error());
    }

    #[test]
    fn io_convenience_constructor() {
        let err = RbError::io(
            "/tmp/theme.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "RB-3002");
        assert!(err.to_string().contains("/tmp/theme.json"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: RbError = json_err.into();
        assert_eq!(err.code(), "RB-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: RbError = toml_err.into();
        assert_eq!(err.code(), "RB-1003");
    }
}
