//! Declared-input schema: `[global]` overrides and `[[custom]]` entries as
//! they appear in `rotaconf.toml|yaml`. Every field is optional here; the
//! gaps are filled from the distribution defaults.

use super::{CompressCommand, CustomConfig, GlobalSettings, Interval};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// `[global]` section. Unset keys keep the OS-family default.
pub struct GlobalOverrides {
    pub interval: Option<Interval>,
    #[serde(alias = "rotate_count")]
    pub rotate: Option<u32>,
    pub dateext: Option<bool>,
    pub create: Option<bool>,
    pub compress: Option<bool>,
    pub compress_command: Option<CompressCommand>,
    pub compress_options: Option<String>,
    #[serde(alias = "delay_compress")]
    pub delaycompress: Option<bool>,
    pub size: Option<String>,
    #[serde(alias = "max_size")]
    pub maxsize: Option<String>,
    /// `su = ""` drops the family default (Debian's `root adm`).
    pub su: Option<String>,
    pub missingok: Option<bool>,
    pub notifempty: Option<bool>,
    #[serde(alias = "manage_global")]
    pub manage: Option<bool>,
}

impl GlobalOverrides {
    /// Merge these overrides onto `base`, returning the effective settings.
    pub fn apply(&self, base: GlobalSettings) -> GlobalSettings {
        GlobalSettings {
            interval: self.interval.unwrap_or(base.interval),
            rotate_count: self.rotate.unwrap_or(base.rotate_count),
            dateext: self.dateext.unwrap_or(base.dateext),
            create: self.create.unwrap_or(base.create),
            compress: self.compress.unwrap_or(base.compress),
            compress_command: self.compress_command.unwrap_or(base.compress_command),
            compress_options: self.compress_options.clone().or(base.compress_options),
            delaycompress: self.delaycompress.unwrap_or(base.delaycompress),
            size: self.size.clone().or(base.size),
            maxsize: self.maxsize.clone().or(base.maxsize),
            su: match self.su.as_deref() {
                Some(s) if s.trim().is_empty() => None,
                Some(s) => Some(s.to_string()),
                None => base.su,
            },
            missingok: self.missingok.unwrap_or(base.missingok),
            notifempty: self.notifempty.unwrap_or(base.notifempty),
            manage_global: self.manage.unwrap_or(base.manage_global),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// One `[[custom]]` entry. `rotate` and `interval` fall back to the
/// effective global values when omitted.
pub struct CustomEntry {
    pub name: String,
    #[serde(default)]
    pub paths: Vec<String>,
    pub rotate: Option<u32>,
    pub interval: Option<Interval>,
    pub size: Option<String>,
    #[serde(alias = "max_size")]
    pub maxsize: Option<String>,
    pub compress: Option<bool>,
    #[serde(alias = "delay_compress")]
    pub delaycompress: Option<bool>,
    pub create: Option<String>,
    pub missingok: Option<bool>,
    pub notifempty: Option<bool>,
    pub copytruncate: Option<bool>,
    pub dateext: Option<bool>,
    #[serde(default, alias = "shared_scripts")]
    pub sharedscripts: bool,
    pub prerotate: Option<String>,
    pub postrotate: Option<String>,
}

impl CustomEntry {
    pub fn resolve(&self, global: &GlobalSettings) -> CustomConfig {
        CustomConfig {
            name: self.name.clone(),
            paths: self.paths.clone(),
            rotate: self.rotate.unwrap_or(global.rotate_count),
            interval: self.interval.unwrap_or(global.interval),
            size: self.size.clone(),
            maxsize: self.maxsize.clone(),
            compress: self.compress,
            delaycompress: self.delaycompress,
            create: self.create.clone(),
            missingok: self.missingok,
            notifempty: self.notifempty,
            copytruncate: self.copytruncate,
            dateext: self.dateext,
            sharedscripts: self.sharedscripts,
            prerotate: self.prerotate.clone(),
            postrotate: self.postrotate.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::defaults_for;
    use crate::models::OsFamily;

    #[test]
    fn test_overrides_keep_unset_defaults() {
        let ov: GlobalOverrides = toml::from_str(
            r#"
interval = "daily"
rotate = 12
compress = true
"#,
        )
        .unwrap();
        let g = ov.apply(defaults_for(OsFamily::Rhel));
        assert_eq!(g.interval, Interval::Daily);
        assert_eq!(g.rotate_count, 12);
        assert!(g.compress);
        // untouched keys come from the RHEL baseline
        assert!(g.dateext);
        assert!(g.create);
    }

    #[test]
    fn test_custom_entry_inherits_rotate_and_interval() {
        let e: CustomEntry = toml::from_str(
            r#"
name = "nginx"
paths = ["/var/log/nginx/*.log"]
"#,
        )
        .unwrap();
        let g = defaults_for(OsFamily::Debian);
        let c = e.resolve(&g);
        assert_eq!(c.rotate, g.rotate_count);
        assert_eq!(c.interval, g.interval);
        assert!(c.compress.is_none());
    }

    #[test]
    fn test_empty_su_clears_family_default() {
        let base = defaults_for(OsFamily::Debian);
        assert_eq!(base.su.as_deref(), Some("root adm"));
        let ov: GlobalOverrides = toml::from_str("su = \"\"\n").unwrap();
        assert_eq!(ov.apply(base.clone()).su, None);
        let ov: GlobalOverrides = toml::from_str("su = \"syslog adm\"\n").unwrap();
        assert_eq!(ov.apply(base.clone()).su.as_deref(), Some("syslog adm"));
        assert_eq!(GlobalOverrides::default().apply(base).su.as_deref(), Some("root adm"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let r: Result<GlobalOverrides, _> = toml::from_str("rotat = 3\n");
        assert!(r.is_err());
    }
}
