//! Installed-package facts. Installation itself is left to the host's
//! package manager; this only looks for the binaries on `PATH`.

use crate::models::{CompressCommand, GlobalSettings};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackageFacts {
    pub logrotate: bool,
    pub zstd: bool,
}

impl PackageFacts {
    pub fn probe() -> Self {
        Self {
            logrotate: which::which("logrotate").is_ok(),
            zstd: which::which("zstd").is_ok(),
        }
    }

    /// Human-readable notes for packages the settings need but the host lacks.
    pub fn missing_for(&self, g: &GlobalSettings) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.logrotate {
            notes.push("logrotate is not installed; rendered configs will not be used".to_string());
        }
        if g.compress && g.compress_command == CompressCommand::Zstd && !self.zstd {
            notes.push("compress_command is zstd but zstd is not installed".to_string());
        }
        for n in &notes {
            warn!("{}", n);
        }
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::defaults_for;
    use crate::models::OsFamily;

    #[test]
    fn test_zstd_note_only_when_selected() {
        let facts = PackageFacts {
            logrotate: true,
            zstd: false,
        };
        let mut g = defaults_for(OsFamily::Debian);
        assert!(facts.missing_for(&g).is_empty());
        g.compress = true;
        g.compress_command = CompressCommand::Zstd;
        assert_eq!(facts.missing_for(&g).len(), 1);
    }

    #[test]
    fn test_missing_logrotate_noted() {
        let facts = PackageFacts {
            logrotate: false,
            zstd: true,
        };
        let notes = facts.missing_for(&defaults_for(OsFamily::Rhel));
        assert!(notes[0].contains("logrotate"));
    }
}
