//! Utility helpers for paths and host identity.

use std::fs;
use std::path::{Path, PathBuf};

/// Return a path relative to the current working directory when possible.
pub fn rel_to_wd(p: &Path) -> String {
    match std::env::current_dir() {
        Ok(wd) => match pathdiff::diff_paths(p, wd) {
            Some(r) if !r.starts_with("..") => r.to_string_lossy().to_string(),
            _ => p.to_string_lossy().to_string(),
        },
        Err(_) => p.to_string_lossy().to_string(),
    }
}

/// Re-anchor an absolute host path under `sysroot` (`/` leaves it as is).
pub fn under_root(sysroot: &Path, host_path: &Path) -> PathBuf {
    match host_path.strip_prefix("/") {
        Ok(rel) => sysroot.join(rel),
        Err(_) => sysroot.join(host_path),
    }
}

/// Best-effort hostname: kernel, then `<sysroot>/etc/hostname`, then
/// `$HOSTNAME`, else `localhost`.
pub fn detect_hostname(sysroot: &Path) -> String {
    let mut candidates = Vec::with_capacity(2);
    // the kernel name only describes the target when operating on `/`
    if sysroot == Path::new("/") {
        candidates.push(PathBuf::from("/proc/sys/kernel/hostname"));
    }
    candidates.push(under_root(sysroot, Path::new("/etc/hostname")));
    for p in &candidates {
        if let Ok(s) = fs::read_to_string(p) {
            let name = s.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
