//! Ownership-scoped synchronization of rendered configs onto disk.
//!
//! Only files named with [`MANAGED_PREFIX`] in the drop-in directory are
//! ever created, rewritten, or removed there; everything else belongs to
//! packages or other tools and is left alone. The global config is touched
//! only when `manage_global` is set, and is backed up once before the first
//! rewrite.
//!
//! Writes go to a temp file in the target directory and are renamed into
//! place, so a failed write never leaves a truncated config behind.

use crate::error::{FileError, FileOp, ValidationErrors};
use crate::models::{DesiredState, FileKind, ManagedFile};
use crate::render::{render_custom, render_global};
use crate::validate::validate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File-name prefix reserved for drop-ins this tool owns.
pub const MANAGED_PREFIX: &str = "managed-";
/// Suffix of the one-time copy of the pre-existing global config.
pub const BACKUP_SUFFIX: &str = ".original";

/// The one ownership predicate for the drop-in directory.
pub fn is_owned(file_name: &str) -> bool {
    file_name.starts_with(MANAGED_PREFIX)
}

/// Where rendered files land.
#[derive(Debug, Clone)]
pub struct Targets {
    /// Global config path on the filesystem being modified.
    pub global: PathBuf,
    /// Drop-in directory on the filesystem being modified.
    pub drop_in_dir: PathBuf,
    /// Drop-in directory as the host's logrotate sees it (`include` line).
    pub include_dir: PathBuf,
}

/// Owned file names currently present in the drop-in directory.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    dir: PathBuf,
    managed: BTreeSet<String>,
}

impl Snapshot {
    /// List the drop-in directory, keeping only owned regular files and
    /// symlinks. A missing directory is an empty snapshot.
    pub fn scan(dir: &Path) -> io::Result<Self> {
        let mut managed = BTreeSet::new();
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    dir: dir.to_path_buf(),
                    managed,
                })
            }
            Err(e) => return Err(e),
        };
        for entry in entries {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(n) => n,
                Err(_) => continue,
            };
            if !is_owned(&name) {
                continue;
            }
            if entry.file_type()?.is_dir() {
                continue;
            }
            managed.insert(name);
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            managed,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.managed.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Written,
    Unchanged,
    Removed,
    BackedUp,
    Failed,
}

/// What happened (or would happen, in a dry run) to one target.
#[derive(Debug, Clone, Serialize)]
pub struct SyncAction {
    pub target: PathBuf,
    pub kind: FileKind,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// When false, compute the same actions without touching disk.
    pub write: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { write: true }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub applied: bool,
    pub actions: Vec<SyncAction>,
    pub errors: Vec<FileError>,
}

impl SyncReport {
    fn count(&self, o: Outcome) -> usize {
        self.actions.iter().filter(|a| a.outcome == o).count()
    }

    pub fn written(&self) -> usize {
        self.count(Outcome::Written)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::Unchanged)
    }

    pub fn removed(&self) -> usize {
        self.count(Outcome::Removed)
    }

    pub fn backed_up(&self) -> usize {
        self.count(Outcome::BackedUp)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Failed)
    }

    /// True when anything was (or would be) changed on disk.
    pub fn has_changes(&self) -> bool {
        self.written() + self.removed() + self.backed_up() > 0
    }

    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty()
    }

    fn push(&mut self, target: &Path, kind: FileKind, outcome: Outcome) {
        self.actions.push(SyncAction {
            target: target.to_path_buf(),
            kind,
            outcome,
        });
    }

    fn fail(&mut self, target: &Path, kind: FileKind, err: FileError) {
        warn!(path = %target.display(), error = %err, "file failed");
        self.push(target, kind, Outcome::Failed);
        self.errors.push(err);
    }
}

/// Render every file the desired state calls for. The global config comes
/// first (only when managed), then drop-ins in declared order.
pub fn plan_files(state: &DesiredState, targets: &Targets) -> Vec<ManagedFile> {
    let mut files = Vec::with_capacity(state.custom_configs.len() + 1);
    if state.global.manage_global {
        files.push(ManagedFile {
            path: targets.global.clone(),
            content: render_global(&state.global, state.os_family, &targets.include_dir),
            kind: FileKind::Global,
        });
    }
    for c in &state.custom_configs {
        files.push(ManagedFile {
            path: targets.drop_in_dir.join(c.file_name()),
            content: render_custom(c, &state.global),
            kind: FileKind::DropIn,
        });
    }
    files
}

/// Converge disk to `desired`, removing owned drop-ins not in it.
///
/// Failures are recorded per file; the remaining files are still processed
/// and nothing already written is rolled back.
pub fn sync(desired: &[ManagedFile], snapshot: &Snapshot, opts: &SyncOptions) -> SyncReport {
    let mut report = SyncReport {
        applied: opts.write,
        ..Default::default()
    };

    for file in desired {
        match file.kind {
            FileKind::Global => sync_global(file, opts, &mut report),
            FileKind::DropIn => match ensure_owned(file, snapshot.dir()) {
                Ok(()) => sync_file(file, opts, &mut report),
                Err(e) => {
                    let err = FileError::new(&file.path, FileOp::Write, &e);
                    report.fail(&file.path, file.kind, err);
                }
            },
        }
    }

    let wanted: HashSet<&str> = desired
        .iter()
        .filter(|f| f.kind == FileKind::DropIn && f.path.parent() == Some(snapshot.dir()))
        .filter_map(|f| f.path.file_name().and_then(|n| n.to_str()))
        .collect();
    for name in snapshot.names() {
        if wanted.contains(name) || !is_owned(name) {
            continue;
        }
        let path = snapshot.dir().join(name);
        if opts.write {
            match fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "removed stale managed config"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "stale config already gone");
                    continue;
                }
                Err(e) => {
                    report.fail(&path, FileKind::DropIn, FileError::new(&path, FileOp::Remove, &e));
                    continue;
                }
            }
        }
        report.push(&path, FileKind::DropIn, Outcome::Removed);
    }
    report
}

/// A drop-in may only land directly in the drop-in directory under an owned
/// name; anything else belongs to someone else.
fn ensure_owned(file: &ManagedFile, dir: &Path) -> io::Result<()> {
    let owned = file.path.parent() == Some(dir)
        && file
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_owned);
    if owned {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("not an owned {}* drop-in in {}", MANAGED_PREFIX, dir.display()),
        ))
    }
}

fn sync_global(file: &ManagedFile, opts: &SyncOptions, report: &mut SyncReport) {
    let current = match read_current(&file.path) {
        Ok(c) => c,
        Err(e) => {
            report.fail(&file.path, file.kind, FileError::new(&file.path, FileOp::Read, &e));
            return;
        }
    };
    if let Some(original) = current.as_deref() {
        let backup = backup_path(&file.path);
        match fs::symlink_metadata(&backup) {
            Ok(_) => debug!(path = %backup.display(), "backup already present"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if opts.write {
                    let mode = fs::metadata(&file.path).ok().map(|m| m.permissions());
                    if let Err(e) = write_atomic(&backup, original, mode) {
                        // without a backup the original must stay in place
                        let err = FileError::new(&backup, FileOp::Backup, &e);
                        report.fail(&file.path, file.kind, err);
                        return;
                    }
                    info!(path = %backup.display(), "backed up global config");
                }
                report.push(&backup, file.kind, Outcome::BackedUp);
            }
            Err(e) => {
                report.fail(&file.path, file.kind, FileError::new(&backup, FileOp::Backup, &e));
                return;
            }
        }
    }
    apply(file, current.as_deref(), opts, report);
}

fn sync_file(file: &ManagedFile, opts: &SyncOptions, report: &mut SyncReport) {
    match read_current(&file.path) {
        Ok(current) => apply(file, current.as_deref(), opts, report),
        Err(e) => report.fail(&file.path, file.kind, FileError::new(&file.path, FileOp::Read, &e)),
    }
}

fn apply(file: &ManagedFile, current: Option<&[u8]>, opts: &SyncOptions, report: &mut SyncReport) {
    if current == Some(file.content.as_bytes()) {
        debug!(path = %file.path.display(), "unchanged");
        report.push(&file.path, file.kind, Outcome::Unchanged);
        return;
    }
    if opts.write {
        let mode = fs::metadata(&file.path).ok().map(|m| m.permissions());
        if let Err(e) = write_atomic(&file.path, file.content.as_bytes(), mode) {
            report.fail(&file.path, file.kind, FileError::new(&file.path, FileOp::Write, &e));
            return;
        }
        info!(path = %file.path.display(), "wrote config");
    }
    report.push(&file.path, file.kind, Outcome::Written);
}

/// `Ok(None)` when the file does not exist yet.
fn read_current(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(b) => Ok(Some(b)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn backup_path(global: &Path) -> PathBuf {
    let mut s = global.as_os_str().to_os_string();
    s.push(BACKUP_SUFFIX);
    PathBuf::from(s)
}

/// Write via a sibling temp file and rename. The temp name starts with the
/// target's own name, so inside the drop-in directory it is still owned.
fn write_atomic(path: &Path, content: &[u8], mode: Option<fs::Permissions>) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{}.", name))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    match mode {
        Some(p) => fs::set_permissions(tmp.path(), p)?,
        None => set_default_mode(tmp.path())?,
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_default_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_mode(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Validate, scan, plan, and synchronize one host.
///
/// Validation failures abort before anything is read or written. A failed
/// scan is reported and stale cleanup is skipped, but desired files are
/// still converged.
pub fn run_sync(
    state: &DesiredState,
    targets: &Targets,
    opts: &SyncOptions,
) -> Result<SyncReport, ValidationErrors> {
    validate(state)?;
    let files = plan_files(state, targets);
    let (snapshot, scan_err) = match Snapshot::scan(&targets.drop_in_dir) {
        Ok(s) => (s, None),
        Err(e) => {
            let err = FileError::new(&targets.drop_in_dir, FileOp::Scan, &e);
            let empty = Snapshot {
                dir: targets.drop_in_dir.clone(),
                managed: BTreeSet::new(),
            };
            (empty, Some(err))
        }
    };
    let mut report = sync(&files, &snapshot, opts);
    if let Some(err) = scan_err {
        warn!(error = %err, "drop-in scan failed; stale cleanup skipped");
        report.errors.push(err);
    }
    info!(
        written = report.written(),
        unchanged = report.skipped(),
        removed = report.removed(),
        failed = report.errors.len(),
        applied = report.applied,
        "sync finished"
    );
    Ok(report)
}
