//! Desired-state model: global rotation settings and per-application
//! drop-in entries, plus the rendered files they turn into.

pub mod desired;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use desired::{CustomEntry, GlobalOverrides};

/// Rotation frequency directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
            Interval::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Interval::Daily),
            "weekly" => Ok(Interval::Weekly),
            "monthly" => Ok(Interval::Monthly),
            "yearly" => Ok(Interval::Yearly),
            _ => Err(format!("unknown interval: {}", s)),
        }
    }
}

/// Compressor used for rotated logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressCommand {
    #[default]
    Gzip,
    Zstd,
}

impl fmt::Display for CompressCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressCommand::Gzip => f.write_str("gzip"),
            CompressCommand::Zstd => f.write_str("zstd"),
        }
    }
}

/// Distribution family of the managed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    #[default]
    #[serde(alias = "ubuntu")]
    Debian,
    #[serde(
        alias = "redhat",
        alias = "centos",
        alias = "fedora",
        alias = "rocky",
        alias = "almalinux"
    )]
    Rhel,
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Debian => f.write_str("debian"),
            OsFamily::Rhel => f.write_str("rhel"),
        }
    }
}

impl FromStr for OsFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debian" | "ubuntu" => Ok(OsFamily::Debian),
            "rhel" | "redhat" | "centos" | "fedora" | "rocky" | "almalinux" => {
                Ok(OsFamily::Rhel)
            }
            _ => Err(format!("unknown os family: {}", s)),
        }
    }
}

/// Host-wide settings rendered into the global logrotate config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub interval: Interval,
    pub rotate_count: u32,
    pub dateext: bool,
    pub create: bool,
    pub compress: bool,
    pub compress_command: CompressCommand,
    pub compress_options: Option<String>,
    pub delaycompress: bool,
    pub size: Option<String>,
    pub maxsize: Option<String>,
    /// `user group` for the `su` directive.
    pub su: Option<String>,
    pub missingok: bool,
    pub notifempty: bool,
    /// When false the global file is neither read nor written.
    pub manage_global: bool,
}

/// One per-application drop-in, written as `managed-<name>.conf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomConfig {
    pub name: String,
    pub paths: Vec<String>,
    pub rotate: u32,
    pub interval: Interval,
    pub size: Option<String>,
    pub maxsize: Option<String>,
    pub compress: Option<bool>,
    pub delaycompress: Option<bool>,
    /// `mode [owner [group]]`
    pub create: Option<String>,
    pub missingok: Option<bool>,
    pub notifempty: Option<bool>,
    pub copytruncate: Option<bool>,
    pub dateext: Option<bool>,
    pub sharedscripts: bool,
    pub prerotate: Option<String>,
    pub postrotate: Option<String>,
}

impl CustomConfig {
    /// Target file name inside the drop-in directory.
    pub fn file_name(&self) -> String {
        format!("{}{}.conf", crate::sync::MANAGED_PREFIX, self.name)
    }
}

/// Everything declared for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredState {
    pub os_family: OsFamily,
    pub global: GlobalSettings,
    pub custom_configs: Vec<CustomConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Global,
    DropIn,
}

/// A file the synchronizer converges: where it lives and what it must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedFile {
    pub path: PathBuf,
    pub content: String,
    pub kind: FileKind,
}
