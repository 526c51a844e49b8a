//! DW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::ops::Range;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DwError>;

/// Top-level error type for dwatch.
#[derive(Debug, Error)]
pub enum DwError {
    #[error("[DW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DW-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[DW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[DW-2001] numeric field {range:?} of {line:?} is not a 64-bit integer")]
    FieldParse { line: String, range: Range<usize> },

    #[error("[DW-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[DW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DW-3101] failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[DW-3102] failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[DW-3103] command `{command}` failed: {status}")]
    ChildFailed { command: String, status: String },

    #[error("[DW-3201] {operation} failed: {details}")]
    Platform {
        operation: &'static str,
        details: String,
    },

    #[error("[DW-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl DwError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DW-1001",
            Self::MissingConfig { .. } => "DW-1002",
            Self::ConfigParse { .. } => "DW-1003",
            Self::FieldParse { .. } => "DW-2001",
            Self::Serialization { .. } => "DW-2101",
            Self::Io { .. } => "DW-3002",
            Self::Spawn { .. } => "DW-3101",
            Self::Wait { .. } => "DW-3102",
            Self::ChildFailed { .. } => "DW-3103",
            Self::Platform { .. } => "DW-3201",
            Self::Runtime { .. } => "DW-3900",
        }
    }

    /// Whether the error was raised before the scheduler could start.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::MissingConfig { .. } | Self::ConfigParse { .. }
        )
    }

    /// Whether the error signals a broken internal invariant rather than a
    /// problem with the environment.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::FieldParse { .. } | Self::Serialization { .. })
    }

    /// Whether a watched command exited in a way that ends the run.
    #[must_use]
    pub const fn is_fatal_child(&self) -> bool {
        matches!(self, Self::ChildFailed { .. })
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

impl From<serde_json::Error> for DwError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for DwError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_variant() -> Vec<DwError> {
        vec![
            DwError::InvalidConfig {
                details: String::new(),
            },
            DwError::MissingConfig {
                path: PathBuf::new(),
            },
            DwError::ConfigParse {
                context: "",
                details: String::new(),
            },
            DwError::FieldParse {
                line: String::new(),
                range: 0..0,
            },
            DwError::Serialization {
                context: "",
                details: String::new(),
            },
            DwError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            DwError::Spawn {
                command: String::new(),
                source: std::io::Error::other("test"),
            },
            DwError::Wait {
                command: String::new(),
                source: std::io::Error::other("test"),
            },
            DwError::ChildFailed {
                command: String::new(),
                status: String::new(),
            },
            DwError::Platform {
                operation: "",
                details: String::new(),
            },
            DwError::Runtime {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = every_variant();
        let codes: Vec<&str> = errors.iter().map(DwError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn display_carries_code_prefix() {
        for err in every_variant() {
            let msg = err.to_string();
            assert!(
                msg.starts_with(&format!("[{}]", err.code())),
                "display should start with its code: {msg}"
            );
        }
    }

    #[test]
    fn config_and_internal_classification() {
        assert!(
            DwError::InvalidConfig {
                details: String::new()
            }
            .is_config()
        );
        assert!(
            !DwError::Runtime {
                details: String::new()
            }
            .is_config()
        );
        assert!(
            DwError::FieldParse {
                line: "x".to_string(),
                range: 0..1
            }
            .is_internal()
        );
        assert!(
            !DwError::ChildFailed {
                command: "false".to_string(),
                status: "exit 127".to_string()
            }
            .is_internal()
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = DwError::io(
            "/tmp/trace.tsv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "DW-3002");
        assert!(err.to_string().contains("/tmp/trace.tsv"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: DwError = json_err.into();
        assert_eq!(err.code(), "DW-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: DwError = toml_err.into();
        assert_eq!(err.code(), "DW-1003");
    }
}
