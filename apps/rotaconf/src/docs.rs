//! Per-host documentation of the declared logrotate state.
//!
//! Built from the same model the renderer consumes, never from disk, so the
//! report describes intent. Output is rewritten on every run.

use crate::models::{CustomConfig, DesiredState, GlobalSettings};
use crate::validate::is_safe_name;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    Markdown,
    Json,
    #[default]
    Both,
}

impl FromStr for DocFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(DocFormat::Markdown),
            "json" => Ok(DocFormat::Json),
            "both" | "all" => Ok(DocFormat::Both),
            _ => Err(format!("unknown docs format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docs {
    pub markdown: Option<String>,
    pub json: Option<String>,
}

const GUIDANCE: &str = "\
## Operations

- Drop-ins written by this tool are named `managed-<name>.conf`; other files
  in the drop-in directory belong to packages and are never modified.
- Do not edit managed files by hand. Change the rotaconf configuration and
  re-run `rotaconf sync` instead.
- The stock global config is kept as `logrotate.conf.original` the first
  time it is replaced.
- Rotation runs from the system scheduler (cron.daily or the logrotate
  timer). To test a config without rotating, run `logrotate -d /etc/logrotate.conf`.
- To force a rotation, run `logrotate -f /etc/logrotate.conf`.
";

/// Serialize the desired state for `host` in the requested format(s).
pub fn emit(state: &DesiredState, host: &str, format: DocFormat) -> Docs {
    let markdown = matches!(format, DocFormat::Markdown | DocFormat::Both)
        .then(|| render_markdown(state, host));
    let json =
        matches!(format, DocFormat::Json | DocFormat::Both).then(|| render_json(state, host));
    Docs { markdown, json }
}

fn render_json(state: &DesiredState, host: &str) -> String {
    let doc = json!({
        "host": host,
        "os_family": state.os_family,
        "global": state.global,
        "custom_configs": state.custom_configs,
    });
    let mut s = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string());
    s.push('\n');
    s
}

fn opt(v: Option<&str>) -> &str {
    v.unwrap_or("-")
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn render_markdown(state: &DesiredState, host: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Logrotate configuration: {}\n", host);
    let _ = writeln!(out, "OS family: `{}`\n", state.os_family);
    settings_table(&mut out, &state.global);

    out.push_str("\n## Custom configurations\n\n");
    if state.custom_configs.is_empty() {
        out.push_str("None.\n");
    }
    for c in &state.custom_configs {
        custom_section(&mut out, c, &state.global);
    }
    out.push('\n');
    out.push_str(GUIDANCE);
    out
}

fn settings_table(out: &mut String, g: &GlobalSettings) {
    out.push_str("## Global settings\n\n");
    out.push_str("| Setting | Value |\n|---|---|\n");
    let rows: [(&str, String); 14] = [
        ("interval", g.interval.to_string()),
        ("rotate", g.rotate_count.to_string()),
        ("dateext", yes_no(g.dateext).into()),
        ("create", yes_no(g.create).into()),
        ("compress", yes_no(g.compress).into()),
        ("compress command", g.compress_command.to_string()),
        ("compress options", opt(g.compress_options.as_deref()).into()),
        ("delaycompress", yes_no(g.delaycompress).into()),
        ("size", opt(g.size.as_deref()).into()),
        ("maxsize", opt(g.maxsize.as_deref()).into()),
        ("su", opt(g.su.as_deref()).into()),
        ("missingok", yes_no(g.missingok).into()),
        ("notifempty", yes_no(g.notifempty).into()),
        ("global file managed", yes_no(g.manage_global).into()),
    ];
    for (k, v) in rows {
        let _ = writeln!(out, "| {} | {} |", k, v);
    }
}

fn custom_section(out: &mut String, c: &CustomConfig, g: &GlobalSettings) {
    let _ = writeln!(out, "### {} (`{}`)\n", c.name, c.file_name());
    out.push_str("Paths:\n\n");
    for p in &c.paths {
        let _ = writeln!(out, "- `{}`", p);
    }
    out.push('\n');
    let compress = match c.compress {
        Some(b) => yes_no(b).to_string(),
        None => format!("inherited ({})", yes_no(g.compress)),
    };
    let _ = writeln!(
        out,
        "Policy: {} rotation, keep {}, compress {}",
        c.interval, c.rotate, compress
    );
    if let Some(s) = c.size.as_deref() {
        let _ = writeln!(out, "- size threshold: {}", s);
    }
    if let Some(s) = c.maxsize.as_deref() {
        let _ = writeln!(out, "- maxsize threshold: {}", s);
    }
    if let Some(s) = c.create.as_deref() {
        let _ = writeln!(out, "- create: `{}`", s);
    }
    if c.postrotate.is_some() {
        let _ = writeln!(
            out,
            "- postrotate script{}",
            if c.sharedscripts { " (shared)" } else { "" }
        );
    }
    out.push('\n');
}

/// Write `<docs_dir>/<host>/logrotate.{md,json}`, returning the paths written.
///
/// `host` must be a single safe path component.
pub fn write_docs(docs: &Docs, docs_dir: &Path, host: &str) -> io::Result<Vec<PathBuf>> {
    if !is_safe_name(host) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("host name '{}' is not a safe directory name", host),
        ));
    }
    let dir = docs_dir.join(host);
    fs::create_dir_all(&dir)?;
    let mut written = Vec::new();
    if let Some(md) = &docs.markdown {
        let p = dir.join("logrotate.md");
        fs::write(&p, md)?;
        written.push(p);
    }
    if let Some(js) = &docs.json {
        let p = dir.join("logrotate.json");
        fs::write(&p, js)?;
        written.push(p);
    }
    info!(dir = %dir.display(), files = written.len(), "wrote documentation");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::defaults_for;
    use crate::models::{CustomEntry, Interval, OsFamily};
    use tempfile::tempdir;

    fn sample() -> DesiredState {
        let mut global = defaults_for(OsFamily::Rhel);
        global.size = Some("100M".into());
        let entry = CustomEntry {
            name: "myapp".into(),
            paths: vec!["/var/log/myapp/*.log".into()],
            rotate: Some(7),
            interval: Some(Interval::Daily),
            maxsize: Some("200M".into()),
            ..Default::default()
        };
        DesiredState {
            os_family: OsFamily::Rhel,
            custom_configs: vec![entry.resolve(&global)],
            global,
        }
    }

    #[test]
    fn test_json_mirrors_model() {
        let st = sample();
        let docs = emit(&st, "web01", DocFormat::Json);
        assert!(docs.markdown.is_none());
        let v: serde_json::Value = serde_json::from_str(docs.json.as_deref().unwrap()).unwrap();
        assert_eq!(v["host"], "web01");
        assert_eq!(v["os_family"], "rhel");
        let global: GlobalSettings = serde_json::from_value(v["global"].clone()).unwrap();
        assert_eq!(global, st.global);
        let customs: Vec<CustomConfig> =
            serde_json::from_value(v["custom_configs"].clone()).unwrap();
        assert_eq!(customs, st.custom_configs);
    }

    #[test]
    fn test_markdown_sections() {
        let docs = emit(&sample(), "web01", DocFormat::Markdown);
        let md = docs.markdown.unwrap();
        assert!(md.starts_with("# Logrotate configuration: web01"));
        assert!(md.contains("| rotate | 4 |"));
        assert!(md.contains("| size | 100M |"));
        assert!(md.contains("### myapp (`managed-myapp.conf`)"));
        assert!(md.contains("- `/var/log/myapp/*.log`"));
        assert!(md.contains("Policy: daily rotation, keep 7, compress inherited (no)"));
        assert!(md.contains("## Operations"));
    }

    #[test]
    fn test_write_docs_per_host_dir() {
        let tmp = tempdir().unwrap();
        let docs = emit(&sample(), "web01", DocFormat::Both);
        let written = write_docs(&docs, tmp.path(), "web01").unwrap();
        assert_eq!(written.len(), 2);
        assert!(tmp.path().join("web01/logrotate.md").exists());
        assert!(tmp.path().join("web01/logrotate.json").exists());
    }

    #[test]
    fn test_write_docs_refuses_host_outside_docs_dir() {
        let tmp = tempdir().unwrap();
        let docs_dir = tmp.path().join("docs");
        let docs = emit(&sample(), "x", DocFormat::Both);
        for host in ["../escaped", "/abs", "..", ""] {
            let err = write_docs(&docs, &docs_dir, host).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
        assert!(!tmp.path().join("escaped").exists());
        assert!(!docs_dir.exists());
    }
}
