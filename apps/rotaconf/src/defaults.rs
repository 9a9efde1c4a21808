//! Distribution-conditioned baselines and OS family detection.
//!
//! The baseline mirrors what each family's `logrotate` package ships in its
//! stock `/etc/logrotate.conf`; user overrides are merged on top before
//! rendering.

use crate::models::{CompressCommand, GlobalSettings, Interval, OsFamily};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Baseline global settings for a distribution family.
pub fn defaults_for(os: OsFamily) -> GlobalSettings {
    let base = GlobalSettings {
        interval: Interval::Weekly,
        rotate_count: 4,
        dateext: false,
        create: true,
        compress: false,
        compress_command: CompressCommand::Gzip,
        compress_options: None,
        delaycompress: false,
        size: None,
        maxsize: None,
        su: None,
        missingok: false,
        notifempty: false,
        manage_global: true,
    };
    match os {
        OsFamily::Debian => GlobalSettings {
            su: Some("root adm".to_string()),
            ..base
        },
        OsFamily::Rhel => GlobalSettings {
            dateext: true,
            ..base
        },
    }
}

const RHEL_WTMP_BTMP: &str = "\
/var/log/wtmp {
    monthly
    create 0664 root utmp
    minsize 1M
    rotate 1
}

/var/log/btmp {
    missingok
    monthly
    create 0600 root utmp
    rotate 1
}
";

/// Stanzas the stock global file carries that must survive a rewrite.
///
/// Debian ships wtmp/btmp as package drop-ins, so nothing is kept there.
pub fn preserved_stanzas(os: OsFamily) -> &'static str {
    match os {
        OsFamily::Debian => "",
        OsFamily::Rhel => RHEL_WTMP_BTMP,
    }
}

/// Detect the OS family from `<sysroot>/etc/os-release`.
pub fn detect_os_family(sysroot: &Path) -> OsFamily {
    let path = sysroot.join("etc/os-release");
    let text = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read os-release; assuming debian");
            return OsFamily::Debian;
        }
    };
    match family_from_os_release(&text) {
        Some(os) => {
            debug!(os = %os, "detected os family");
            os
        }
        None => {
            warn!(path = %path.display(), "unrecognised distribution; assuming debian");
            OsFamily::Debian
        }
    }
}

fn family_from_os_release(text: &str) -> Option<OsFamily> {
    let mut ids: Vec<String> = Vec::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() == "ID" || key.trim() == "ID_LIKE" {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            ids.extend(value.split_whitespace().map(str::to_lowercase));
        }
    }
    ids.iter().find_map(|id| id.parse::<OsFamily>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_family_baselines_differ() {
        let deb = defaults_for(OsFamily::Debian);
        let rhel = defaults_for(OsFamily::Rhel);
        assert_eq!(deb.interval, Interval::Weekly);
        assert_eq!(deb.su.as_deref(), Some("root adm"));
        assert!(!deb.dateext);
        assert!(rhel.dateext);
        assert!(rhel.su.is_none());
        assert!(!deb.compress && !rhel.compress);
    }

    #[test]
    fn test_preserved_stanzas_only_on_rhel() {
        assert!(preserved_stanzas(OsFamily::Debian).is_empty());
        let s = preserved_stanzas(OsFamily::Rhel);
        assert!(s.contains("/var/log/wtmp {"));
        assert!(s.contains("/var/log/btmp {"));
    }

    #[test]
    fn test_os_release_id_like() {
        let rocky = "NAME=\"Rocky Linux\"\nID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n";
        assert_eq!(family_from_os_release(rocky), Some(OsFamily::Rhel));
        let mint = "ID=linuxmint\nID_LIKE=\"ubuntu debian\"\n";
        assert_eq!(family_from_os_release(mint), Some(OsFamily::Debian));
        assert_eq!(family_from_os_release("ID=arch\n"), None);
    }

    #[test]
    fn test_detect_falls_back_to_debian() {
        let tmp = tempdir().unwrap();
        assert_eq!(detect_os_family(tmp.path()), OsFamily::Debian);
        std::fs::create_dir_all(tmp.path().join("etc")).unwrap();
        std::fs::write(tmp.path().join("etc/os-release"), "ID=fedora\n").unwrap();
        assert_eq!(detect_os_family(tmp.path()), OsFamily::Rhel);
    }
}
