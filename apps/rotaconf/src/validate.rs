//! Pre-flight validation of the declared state.
//!
//! Every check runs and all problems are returned together, so the operator
//! can fix a config in one pass. Nothing on disk is touched.

use crate::error::{ValidationError, ValidationErrors};
use crate::models::{CustomConfig, DesiredState, GlobalSettings};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("static regex"))
}

fn size_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+[kKMG]?$").expect("static regex"))
}

fn create_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^[0-7]{3,4}",
            r"([ \t]+[A-Za-z0-9_][A-Za-z0-9_.-]*([ \t]+[A-Za-z0-9_][A-Za-z0-9_.-]*)?)?$",
        ))
        .expect("static regex")
    })
}

fn su_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*[ \t]+[A-Za-z0-9_][A-Za-z0-9_.-]*$")
            .expect("static regex")
    })
}

/// A single path component made of `[A-Za-z0-9._-]`, not starting with `.`
/// or `-`. Used for drop-in names and the per-host docs directory.
pub fn is_safe_name(s: &str) -> bool {
    name_re().is_match(s)
}

/// Tabs are allowed; anything else below 0x20 (newlines included) would
/// smuggle extra directives into the rendered file.
fn has_control_chars(s: &str) -> bool {
    s.chars().any(|c| c.is_control() && c != '\t')
}

/// Validate the whole desired state.
pub fn validate(state: &DesiredState) -> Result<(), ValidationErrors> {
    let mut errs = Vec::new();
    check_global(&state.global, &mut errs);

    let mut seen: HashSet<&str> = HashSet::new();
    for c in &state.custom_configs {
        if !seen.insert(c.name.as_str()) {
            errs.push(ValidationError::DuplicateName(c.name.clone()));
        }
        check_custom(c, &mut errs);
    }

    if errs.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errs))
    }
}

fn check_global(g: &GlobalSettings, errs: &mut Vec<ValidationError>) {
    if g.rotate_count == 0 {
        errs.push(ValidationError::NonPositive {
            field: "global.rotate".into(),
        });
    }
    check_size("global.size", g.size.as_deref(), errs);
    check_size("global.maxsize", g.maxsize.as_deref(), errs);
    if let Some(opts) = g.compress_options.as_deref() {
        if has_control_chars(opts) {
            errs.push(ValidationError::ControlChars {
                field: "global.compress_options".into(),
            });
        }
    }
    if let Some(su) = g.su.as_deref() {
        if has_control_chars(su) {
            errs.push(ValidationError::ControlChars {
                field: "global.su".into(),
            });
        } else if !su_re().is_match(su.trim()) {
            errs.push(ValidationError::BadSu {
                field: "global.su".into(),
                value: su.to_string(),
            });
        }
    }
}

fn check_custom(c: &CustomConfig, errs: &mut Vec<ValidationError>) {
    if !is_safe_name(&c.name) {
        errs.push(ValidationError::UnsafeName(c.name.clone()));
    }
    if c.paths.is_empty() {
        errs.push(ValidationError::EmptyPaths(c.name.clone()));
    }
    for p in &c.paths {
        if let Some(reason) = path_problem(p) {
            errs.push(ValidationError::BadPath {
                name: c.name.clone(),
                path: p.clone(),
                reason,
            });
        }
    }
    if c.rotate == 0 {
        errs.push(ValidationError::NonPositive {
            field: format!("custom.{}.rotate", c.name),
        });
    }
    check_size(&format!("custom.{}.size", c.name), c.size.as_deref(), errs);
    check_size(&format!("custom.{}.maxsize", c.name), c.maxsize.as_deref(), errs);
    if let Some(spec) = c.create.as_deref() {
        if has_control_chars(spec) {
            errs.push(ValidationError::ControlChars {
                field: format!("custom.{}.create", c.name),
            });
        } else if !create_re().is_match(spec.trim()) {
            errs.push(ValidationError::BadCreate {
                field: format!("custom.{}.create", c.name),
                value: spec.to_string(),
            });
        }
    }
    for (label, script) in [("prerotate", &c.prerotate), ("postrotate", &c.postrotate)] {
        if let Some(body) = script {
            if body.lines().any(|l| l.trim() == "endscript") {
                errs.push(ValidationError::ScriptTerminator {
                    field: format!("custom.{}.{}", c.name, label),
                });
            }
        }
    }
}

fn check_size(field: &str, value: Option<&str>, errs: &mut Vec<ValidationError>) {
    if let Some(v) = value {
        if !size_re().is_match(v) {
            errs.push(ValidationError::BadSize {
                field: field.to_string(),
                value: v.to_string(),
            });
        }
    }
}

fn path_problem(p: &str) -> Option<String> {
    if !p.starts_with('/') {
        return Some("is not absolute".to_string());
    }
    if p.contains('"') || p.chars().any(char::is_control) {
        return Some("contains a quote or control character".to_string());
    }
    if let Err(e) = glob::Pattern::new(p) {
        return Some(format!("is not a valid glob: {}", e.msg));
    }
    None
}
