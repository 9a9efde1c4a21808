//! Configuration discovery and effective settings resolution.
//!
//! rotaconf reads `rotaconf.toml|yaml|yml` from the working directory (or
//! the closest ancestor), or the file passed with `--config`, and merges it
//! with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `paths.sysroot`: `/`
//! - `paths.logrotate_conf`: `/etc/logrotate.conf`
//! - `paths.drop_in_dir`: `/etc/logrotate.d`
//! - `paths.docs_dir`: `docs` (relative to the config file)
//! - `host.os_family`: detected from `os-release`
//! - `docs.enabled`: true, `docs.format`: `both`
//! - `output`: `human`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::defaults::{defaults_for, detect_os_family};
use crate::docs::DocFormat;
use crate::error::ConfigError;
use crate::models::{CustomEntry, DesiredState, GlobalOverrides, OsFamily};
use crate::sync::Targets;
use crate::utils::{detect_hostname, under_root};
use crate::validate::is_safe_name;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_NAMES: [&str; 3] = ["rotaconf.toml", "rotaconf.yaml", "rotaconf.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// `[host]` section.
pub struct HostCfg {
    pub hostname: Option<String>,
    pub os_family: Option<OsFamily>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// `[paths]` section. Host paths are absolute as the target host sees them.
pub struct PathsCfg {
    pub sysroot: Option<String>,
    pub logrotate_conf: Option<String>,
    pub drop_in_dir: Option<String>,
    pub docs_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// `[docs]` section.
pub struct DocsCfg {
    pub enabled: Option<bool>,
    pub format: Option<DocFormat>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// Root configuration loaded from `rotaconf.toml|yaml`.
pub struct RotaconfConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub host: HostCfg,
    #[serde(default)]
    pub paths: PathsCfg,
    #[serde(default)]
    pub global: GlobalOverrides,
    #[serde(default)]
    pub docs: DocsCfg,
    #[serde(default)]
    pub custom: Vec<CustomEntry>,
}

/// Flags that can override the config file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub config: Option<String>,
    pub sysroot: Option<String>,
    pub output: Option<String>,
    pub docs_dir: Option<String>,
    pub docs_format: Option<String>,
    pub no_docs: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub config_path: PathBuf,
    pub sysroot: PathBuf,
    pub logrotate_conf: PathBuf,
    pub drop_in_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub docs_enabled: bool,
    pub docs_format: DocFormat,
    pub hostname: String,
    pub output: String,
    pub state: DesiredState,
}

impl Effective {
    /// Paths on the filesystem being modified (sysroot applied).
    pub fn targets(&self) -> Targets {
        Targets {
            global: under_root(&self.sysroot, &self.logrotate_conf),
            drop_in_dir: under_root(&self.sysroot, &self.drop_in_dir),
            include_dir: self.drop_in_dir.clone(),
        }
    }
}

/// Walk upward from `start` looking for a rotaconf config file.
pub fn detect_config(start: &Path) -> Option<PathBuf> {
    let mut cur = start;
    loop {
        for name in CONFIG_NAMES {
            let p = cur.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
        cur = cur.parent()?;
    }
}

/// Load `RotaconfConfig`; the extension picks TOML or YAML.
pub fn load_config(path: &Path) -> Result<RotaconfConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&s).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Build the desired state: OS baseline, then `[global]`, then entries.
pub fn desired_state(cfg: &RotaconfConfig, os: OsFamily) -> DesiredState {
    let global = cfg.global.apply(defaults_for(os));
    let custom_configs = cfg.custom.iter().map(|e| e.resolve(&global)).collect();
    DesiredState {
        os_family: os,
        global,
        custom_configs,
    }
}

/// Resolve `Effective` by merging CLI flags, the config file, and defaults.
pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective, ConfigError> {
    let config_path = match cli.config.as_deref() {
        Some(p) => PathBuf::from(p),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            detect_config(&cwd).ok_or(ConfigError::NotFound(cwd))?
        }
    };
    let cfg = load_config(&config_path)?;
    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let sysroot = PathBuf::from(
        cli.sysroot
            .clone()
            .or_else(|| cfg.paths.sysroot.clone())
            .unwrap_or_else(|| "/".to_string()),
    );
    let logrotate_conf = PathBuf::from(
        cfg.paths
            .logrotate_conf
            .clone()
            .unwrap_or_else(|| "/etc/logrotate.conf".to_string()),
    );
    let drop_in_dir = PathBuf::from(
        cfg.paths
            .drop_in_dir
            .clone()
            .unwrap_or_else(|| "/etc/logrotate.d".to_string()),
    );
    for (field, p) in [
        ("paths.logrotate_conf", &logrotate_conf),
        ("paths.drop_in_dir", &drop_in_dir),
    ] {
        if !p.is_absolute() {
            return Err(ConfigError::InvalidValue {
                field,
                message: format!("'{}' must be an absolute host path", p.display()),
            });
        }
    }
    let docs_dir = match cli.docs_dir.as_deref() {
        Some(d) => PathBuf::from(d),
        None => base_dir.join(cfg.paths.docs_dir.as_deref().unwrap_or("docs")),
    };

    let docs_format = match cli.docs_format.as_deref() {
        Some(f) => f.parse().map_err(|message| ConfigError::InvalidValue {
            field: "--format",
            message,
        })?,
        None => cfg.docs.format.unwrap_or_default(),
    };
    let docs_enabled = !cli.no_docs && cfg.docs.enabled.unwrap_or(true);

    let output = cli
        .output
        .clone()
        .or_else(|| cfg.output.clone())
        .unwrap_or_else(|| "human".to_string());

    let os_family = cfg
        .host
        .os_family
        .unwrap_or_else(|| detect_os_family(&sysroot));
    let hostname = cfg
        .host
        .hostname
        .clone()
        .unwrap_or_else(|| detect_hostname(&sysroot));
    if !is_safe_name(&hostname) {
        return Err(ConfigError::InvalidValue {
            field: "host.hostname",
            message: format!(
                "'{}' cannot name a docs directory (use [A-Za-z0-9._-], no path separators)",
                hostname
            ),
        });
    }

    let state = desired_state(&cfg, os_family);

    Ok(Effective {
        config_path,
        sysroot,
        logrotate_conf,
        drop_in_dir,
        docs_dir,
        docs_enabled,
        docs_format,
        hostname,
        output,
        state,
    })
}
