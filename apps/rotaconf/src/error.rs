//! Error types.
//!
//! Configuration and validation errors are fatal before anything is
//! written. File errors are per target and collected into the sync report.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to locate, read, or parse the desired-state file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no rotaconf.{{toml,yaml,yml}} found from {0} upwards (pass --config)")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// One problem found in the declared state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate custom config name '{0}'")]
    DuplicateName(String),

    #[error(
        "custom config name '{0}' is not filesystem-safe \
         (use [A-Za-z0-9._-], not starting with '.' or '-')"
    )]
    UnsafeName(String),

    #[error("custom config '{0}' has no paths")]
    EmptyPaths(String),

    #[error("custom config '{name}': path '{path}' {reason}")]
    BadPath {
        name: String,
        path: String,
        reason: String,
    },

    #[error("{field} must be a positive integer")]
    NonPositive { field: String },

    #[error("{field}: '{value}' is not a size (expected digits with optional k, M or G)")]
    BadSize { field: String, value: String },

    #[error(
        "{field}: '{value}' is not a create spec \
         (expected `mode [owner [group]]` with an octal mode)"
    )]
    BadCreate { field: String, value: String },

    #[error("{field}: '{value}' is not an su spec (expected `user group`)")]
    BadSu { field: String, value: String },

    #[error("{field}: script must not contain a bare 'endscript' line")]
    ScriptTerminator { field: String },

    #[error("{field}: value must be a single line without control characters")]
    ControlChars { field: String },
}

/// All validation problems for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for e in &self.0 {
            write!(f, "\n  - {}", e)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOp {
    Read,
    Backup,
    Write,
    Remove,
    Scan,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileOp::Read => "read",
            FileOp::Backup => "back up",
            FileOp::Write => "write",
            FileOp::Remove => "remove",
            FileOp::Scan => "scan",
        };
        f.write_str(s)
    }
}

/// A filesystem failure tied to a single target.
#[derive(Error, Debug, Clone, Serialize)]
#[error("failed to {op} {}: {message}", .path.display())]
pub struct FileError {
    pub path: PathBuf,
    pub op: FileOp,
    pub message: String,
}

impl FileError {
    pub fn new(path: impl Into<PathBuf>, op: FileOp, err: &std::io::Error) -> Self {
        Self {
            path: path.into(),
            op,
            message: err.to_string(),
        }
    }
}
