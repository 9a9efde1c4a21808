//! Render the desired state into logrotate directive syntax.
//!
//! Rendering is pure and byte-stable: the synchronizer compares the output
//! with what is on disk, so directive order never depends on anything but
//! the input.

use crate::defaults::preserved_stanzas;
use crate::models::{CompressCommand, CustomConfig, GlobalSettings, OsFamily};
use std::fmt::Write as _;
use std::path::Path;
use tracing::warn;

const HEADER: &str = "# Managed by rotaconf. Local changes will be overwritten.\n";
const INDENT: &str = "    ";

/// Render the global config (`/etc/logrotate.conf`).
pub fn render_global(g: &GlobalSettings, os: OsFamily, drop_in_dir: &Path) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    let line = |out: &mut String, s: &str| {
        out.push_str(s);
        out.push('\n');
    };
    line(&mut out, g.interval.as_str());
    line(&mut out, &format!("rotate {}", g.rotate_count));
    if g.dateext {
        line(&mut out, "dateext");
    }
    if g.create {
        line(&mut out, "create");
    }
    if let Some(su) = g.su.as_deref() {
        line(&mut out, &format!("su {}", su.trim()));
    }
    if g.missingok {
        line(&mut out, "missingok");
    }
    if g.notifempty {
        line(&mut out, "notifempty");
    }
    if g.compress {
        line(&mut out, "compress");
        if g.compress_command == CompressCommand::Zstd {
            line(&mut out, "compresscmd /usr/bin/zstd");
            line(&mut out, "uncompresscmd /usr/bin/unzstd");
            line(&mut out, "compressext .zst");
        }
        if let Some(opts) = g.compress_options.as_deref().filter(|o| !o.trim().is_empty()) {
            line(&mut out, &format!("compressoptions {}", opts.trim()));
        }
        if g.delaycompress {
            line(&mut out, "delaycompress");
        }
    } else if g.delaycompress {
        warn!("global delaycompress ignored because compress is off");
    }
    if let Some(size) = g.size.as_deref() {
        line(&mut out, &format!("size {}", size));
    }
    if let Some(maxsize) = g.maxsize.as_deref() {
        line(&mut out, &format!("maxsize {}", maxsize));
    }

    out.push('\n');
    let _ = writeln!(out, "include {}", drop_in_dir.display());

    let preserved = preserved_stanzas(os);
    if !preserved.is_empty() {
        out.push('\n');
        out.push_str(preserved);
    }
    out
}

/// Render one drop-in (`managed-<name>.conf`).
///
/// Overrides left unset are omitted so logrotate inherits the global value.
pub fn render_custom(c: &CustomConfig, global: &GlobalSettings) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    let paths: Vec<String> = c.paths.iter().map(|p| quote_path(p)).collect();
    let _ = writeln!(out, "{} {{", paths.join(" "));

    directive(&mut out, &format!("rotate {}", c.rotate));
    directive(&mut out, c.interval.as_str());
    if let Some(size) = c.size.as_deref() {
        directive(&mut out, &format!("size {}", size));
    }
    if let Some(maxsize) = c.maxsize.as_deref() {
        directive(&mut out, &format!("maxsize {}", maxsize));
    }
    for (flag, on, off) in [
        (c.missingok, "missingok", "nomissingok"),
        (c.notifempty, "notifempty", "ifempty"),
        (c.copytruncate, "copytruncate", "nocopytruncate"),
        (c.dateext, "dateext", "nodateext"),
        (c.compress, "compress", "nocompress"),
    ] {
        match flag {
            Some(true) => directive(&mut out, on),
            Some(false) => directive(&mut out, off),
            None => {}
        }
    }
    let compress_effective = c.compress.unwrap_or(global.compress);
    match c.delaycompress {
        Some(true) if compress_effective => directive(&mut out, "delaycompress"),
        Some(true) => warn!(
            name = %c.name,
            "delaycompress ignored because compression is off for this config"
        ),
        Some(false) => directive(&mut out, "nodelaycompress"),
        None => {}
    }
    if let Some(spec) = c.create.as_deref() {
        directive(&mut out, &format!("create {}", spec.trim()));
    }
    if c.sharedscripts {
        directive(&mut out, "sharedscripts");
    }
    for (label, script) in [("prerotate", &c.prerotate), ("postrotate", &c.postrotate)] {
        if let Some(body) = script {
            directive(&mut out, label);
            // Bodies go out byte-for-byte; heredocs break if lines are re-indented.
            out.push_str(body);
            if !body.is_empty() && !body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(INDENT);
            out.push_str("endscript\n");
        }
    }
    out.push_str("}\n");
    out
}

fn directive(out: &mut String, s: &str) {
    out.push_str(INDENT);
    out.push_str(s);
    out.push('\n');
}

fn quote_path(p: &str) -> String {
    if p.chars().any(char::is_whitespace) {
        format!("\"{}\"", p)
    } else {
        p.to_string()
    }
}
