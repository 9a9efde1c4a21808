//! Output rendering for sync, validate, and docs commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields and a top-level summary.

use crate::error::ValidationErrors;
use crate::packages::PackageFacts;
use crate::sync::{Outcome, SyncReport};
use crate::utils::rel_to_wd;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn paint(color: bool, label: &str, style: fn(&str) -> String) -> String {
    if color {
        style(label)
    } else {
        label.to_string()
    }
}

/// Print sync actions summarizing writes, skips, removals, and failures.
pub fn print_sync(
    report: &SyncReport,
    host: &str,
    notes: &[String],
    facts: &PackageFacts,
    output: &str,
) {
    match output {
        "json" => {
            let items: Vec<_> = report
                .actions
                .iter()
                .map(|a| {
                    json!({
                        "target": a.target,
                        "kind": a.kind,
                        "outcome": a.outcome,
                    })
                })
                .collect();
            let summary = json!({
                "wrote": report.written(),
                "unchanged": report.skipped(),
                "removed": report.removed(),
                "backed_up": report.backed_up(),
                "failed": report.failed(),
                "total": report.actions.len(),
                "applied": report.applied,
            });
            let out = json!({
                "host": host,
                "results": items,
                "errors": report.errors,
                "packages": facts,
                "notes": notes,
                "summary": summary,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        _ => {
            let color = use_colors(output);
            let pending = !report.applied;
            for a in &report.actions {
                let target = rel_to_wd(&a.target);
                let label = match (a.outcome, pending) {
                    (Outcome::Written, false) => {
                        paint(color, "✏️  wrote:", |s| s.green().bold().to_string())
                    }
                    (Outcome::Written, true) => {
                        paint(color, "✏️  would write:", |s| s.green().to_string())
                    }
                    (Outcome::Removed, false) => {
                        paint(color, "🗑️  removed:", |s| s.magenta().bold().to_string())
                    }
                    (Outcome::Removed, true) => {
                        paint(color, "🗑️  would remove:", |s| s.magenta().to_string())
                    }
                    (Outcome::BackedUp, false) => {
                        paint(color, "📦 backed up:", |s| s.cyan().bold().to_string())
                    }
                    (Outcome::BackedUp, true) => {
                        paint(color, "📦 would back up:", |s| s.cyan().to_string())
                    }
                    (Outcome::Unchanged, _) => {
                        paint(color, "no changes:", |s| s.bright_black().to_string())
                    }
                    (Outcome::Failed, _) => {
                        paint(color, "✖ failed:", |s| s.red().bold().to_string())
                    }
                };
                println!("{} {}", label, target);
            }
            for e in &report.errors {
                let label = paint(color, "✖ ⟦error⟧", |s| s.red().bold().to_string());
                eprintln!("{} {}", label, e);
            }
            for n in notes {
                let label = paint(color, "ℹ️  note:", |s| s.blue().bold().to_string());
                eprintln!("{} {}", label, n);
            }
            let summary = format!(
                "— Summary — host={} wrote={} unchanged={} removed={} failed={}{}",
                host,
                report.written(),
                report.skipped(),
                report.removed(),
                report.failed(),
                if pending { " (dry run)" } else { "" }
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Print validation problems; called before any file is touched.
pub fn print_validation(errs: &ValidationErrors, output: &str) {
    match output {
        "json" => {
            let items: Vec<String> = errs.0.iter().map(|e| e.to_string()).collect();
            let out = json!({ "valid": false, "errors": items });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        _ => {
            let color = use_colors(output);
            for e in &errs.0 {
                eprintln!("{} {}", paint(color, "❌ error:", |s| s.red().bold().to_string()), e);
            }
        }
    }
}

pub fn print_valid(custom_count: usize, output: &str) {
    match output {
        "json" => println!(
            "{}",
            json!({ "valid": true, "custom_configs": custom_count })
        ),
        _ => {
            let msg = format!("✅ configuration valid ({} custom config(s))", custom_count);
            if use_colors(output) {
                println!("{}", msg.green());
            } else {
                println!("{}", msg);
            }
        }
    }
}

pub fn print_docs_written(paths: &[PathBuf], output: &str) {
    match output {
        "json" => println!("{}", json!({ "docs": paths })),
        _ => {
            let color = use_colors(output);
            for p in paths {
                let label = paint(color, "📝 docs:", |s| s.green().bold().to_string());
                println!("{} {}", label, rel_to_wd(p));
            }
        }
    }
}
