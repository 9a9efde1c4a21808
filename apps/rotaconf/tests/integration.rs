use rotaconf::config::{resolve_effective, CliOverrides, Effective};
use rotaconf::docs;
use rotaconf::sync::{run_sync, SyncOptions, SyncReport};
use std::fs;
use std::path::Path;

// Integration-style tests using a temp dir as the host's `/`

const SCENARIO: &str = r#"
[host]
hostname = "web01"
os_family = "debian"

[global]
interval = "daily"
rotate = 12
compress = true
compress_command = "gzip"
delaycompress = true
size = "100M"
manage = true

[[custom]]
name = "myapp"
paths = ["/var/log/myapp/*.log"]
rotate = 7
interval = "daily"
maxsize = "200M"
compress = true
"#;

fn setup(root: &Path, body: &str) -> Effective {
    fs::create_dir_all(root.join("sysroot/etc/logrotate.d")).unwrap();
    let cfg = format!(
        "[paths]\nsysroot = \"{}\"\ndocs_dir = \"docs\"\n{}",
        root.join("sysroot").display(),
        body
    );
    fs::write(root.join("rotaconf.toml"), cfg).unwrap();
    resolve_effective(&CliOverrides {
        config: root.join("rotaconf.toml").to_str().map(String::from),
        ..Default::default()
    })
    .unwrap()
}

fn run(eff: &Effective) -> SyncReport {
    run_sync(&eff.state, &eff.targets(), &SyncOptions::default()).unwrap()
}

fn dir_listing(dir: &Path) -> Vec<(String, String)> {
    let mut out: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| {
            (
                e.file_name().to_string_lossy().to_string(),
                fs::read_to_string(e.path()).unwrap(),
            )
        })
        .collect();
    out.sort();
    out
}

#[test]
fn scenario_writes_global_and_dropin_then_converges() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(root, SCENARIO);
    let etc = root.join("sysroot/etc");

    let r1 = run(&eff);
    assert!(!r1.is_failed(), "{:?}", r1.errors);
    assert_eq!(r1.written(), 2);

    let global = fs::read_to_string(etc.join("logrotate.conf")).unwrap();
    for d in ["daily", "rotate 12", "compress", "delaycompress", "size 100M"] {
        assert!(global.lines().any(|l| l == d), "missing '{d}' in:\n{global}");
    }
    assert!(global.contains("include /etc/logrotate.d\n"));

    let app = fs::read_to_string(etc.join("logrotate.d/managed-myapp.conf")).unwrap();
    assert!(app.contains("/var/log/myapp/*.log {\n"));
    for d in ["rotate 7", "daily", "maxsize 200M", "compress"] {
        assert!(app.lines().any(|l| l.trim() == d), "missing '{d}' in:\n{app}");
    }
    assert!(app.trim_end().ends_with('}'));

    let before = dir_listing(&etc.join("logrotate.d"));
    let r2 = run(&eff);
    assert_eq!(r2.written(), 0);
    assert_eq!(r2.skipped(), 2);
    assert!(!r2.has_changes());
    assert_eq!(dir_listing(&etc.join("logrotate.d")), before);
}

#[test]
fn foreign_files_are_never_touched() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(
        root,
        r#"
[host]
os_family = "debian"
[[custom]]
name = "apt"
paths = ["/var/log/apt/*.log"]
"#,
    );
    let d = root.join("sysroot/etc/logrotate.d");
    fs::write(d.join("apt"), "package owned\n").unwrap();
    fs::write(d.join("myapp.conf"), "hand written\n").unwrap();

    for _ in 0..2 {
        let r = run(&eff);
        assert!(!r.is_failed());
    }
    assert_eq!(fs::read_to_string(d.join("apt")).unwrap(), "package owned\n");
    assert_eq!(fs::read_to_string(d.join("myapp.conf")).unwrap(), "hand written\n");
    assert!(d.join("managed-apt.conf").exists());
    // no temp files left behind
    assert_eq!(fs::read_dir(&d).unwrap().count(), 3);
}

#[test]
fn removed_entry_deletes_only_its_managed_file() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let two = r#"
[host]
os_family = "debian"
[[custom]]
name = "a"
paths = ["/var/log/a.log"]
[[custom]]
name = "b"
paths = ["/var/log/b.log"]
"#;
    let eff = setup(root, two);
    let d = root.join("sysroot/etc/logrotate.d");
    fs::write(d.join("b-notes"), "keep\n").unwrap();
    assert_eq!(run(&eff).written(), 3);

    let one = two.split("[[custom]]\nname = \"b\"").next().unwrap().to_string();
    let eff = setup(root, &one);
    let r = run(&eff);
    assert_eq!(r.removed(), 1);
    assert!(d.join("managed-a.conf").exists());
    assert!(!d.join("managed-b.conf").exists());
    assert!(d.join("b-notes").exists());
}

#[test]
fn global_backup_is_taken_once() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(root, SCENARIO);
    let etc = root.join("sysroot/etc");
    fs::write(etc.join("logrotate.conf"), "# stock\nweekly\nrotate 4\n").unwrap();

    let r1 = run(&eff);
    assert_eq!(r1.backed_up(), 1);
    assert_eq!(
        fs::read_to_string(etc.join("logrotate.conf.original")).unwrap(),
        "# stock\nweekly\nrotate 4\n"
    );

    let eff = setup(root, &SCENARIO.replace("rotate = 12", "rotate = 30"));
    let r2 = run(&eff);
    assert_eq!(r2.backed_up(), 0);
    assert_eq!(r2.written(), 1);
    assert!(fs::read_to_string(etc.join("logrotate.conf")).unwrap().contains("rotate 30\n"));
    assert_eq!(
        fs::read_to_string(etc.join("logrotate.conf.original")).unwrap(),
        "# stock\nweekly\nrotate 4\n"
    );
}

#[test]
fn unmanaged_global_is_left_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(root, &SCENARIO.replace("manage = true", "manage = false"));
    let etc = root.join("sysroot/etc");
    fs::write(etc.join("logrotate.conf"), "stock\n").unwrap();

    let r = run(&eff);
    assert_eq!(r.written(), 1);
    assert_eq!(fs::read_to_string(etc.join("logrotate.conf")).unwrap(), "stock\n");
    assert!(!etc.join("logrotate.conf.original").exists());
}

#[test]
fn one_failing_file_does_not_block_others() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(
        root,
        r#"
[host]
os_family = "rhel"
[[custom]]
name = "broken"
paths = ["/var/log/broken.log"]
[[custom]]
name = "fine"
paths = ["/var/log/fine.log"]
"#,
    );
    let d = root.join("sysroot/etc/logrotate.d");
    // a directory where the file should go cannot be read or replaced
    fs::create_dir(d.join("managed-broken.conf")).unwrap();

    let r = run(&eff);
    assert!(r.is_failed());
    assert_eq!(r.errors.len(), 1);
    assert!(r.errors[0].path.ends_with("managed-broken.conf"));
    assert!(d.join("managed-fine.conf").is_file());
    assert!(fs::read_to_string(root.join("sysroot/etc/logrotate.conf"))
        .unwrap()
        .contains("/var/log/wtmp {"));
}

#[test]
fn validation_errors_block_all_writes() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(
        root,
        r#"
[host]
os_family = "debian"
[[custom]]
name = "dup"
paths = ["/var/log/a.log"]
[[custom]]
name = "dup"
paths = ["/var/log/b.log"]
"#,
    );
    let errs = run_sync(&eff.state, &eff.targets(), &SyncOptions::default()).unwrap_err();
    assert_eq!(errs.0.len(), 1);
    assert!(!root.join("sysroot/etc/logrotate.conf").exists());
    assert_eq!(
        fs::read_dir(root.join("sysroot/etc/logrotate.d")).unwrap().count(),
        0
    );
}

#[test]
fn dry_run_reports_but_does_not_write() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(root, SCENARIO);
    let r = run_sync(&eff.state, &eff.targets(), &SyncOptions { write: false }).unwrap();
    assert!(r.has_changes());
    assert_eq!(r.written(), 2);
    assert!(!root.join("sysroot/etc/logrotate.conf").exists());
}

#[test]
fn docs_describe_declared_state() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(root, SCENARIO);
    let d = docs::emit(&eff.state, &eff.hostname, eff.docs_format);
    let written = docs::write_docs(&d, &eff.docs_dir, &eff.hostname).unwrap();
    assert_eq!(written.len(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("docs/web01/logrotate.json")).unwrap())
            .unwrap();
    assert_eq!(json["global"]["rotate_count"], 12);
    assert_eq!(json["custom_configs"][0]["maxsize"], "200M");
    let md = fs::read_to_string(root.join("docs/web01/logrotate.md")).unwrap();
    assert!(md.contains("managed-myapp.conf"));
}

#[test]
fn heredoc_scripts_and_cleared_su_reach_disk_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let eff = setup(
        root,
        r#"
[host]
os_family = "debian"
[global]
su = ""
manage = true
[[custom]]
name = "notify"
paths = ["/var/log/notify.log"]
postrotate = """
cat <<EOF > /run/notify.stamp
rotated
EOF
"""
"#,
    );
    assert!(!run(&eff).is_failed());
    let global = fs::read_to_string(root.join("sysroot/etc/logrotate.conf")).unwrap();
    assert!(!global.lines().any(|l| l.starts_with("su ")), "{global}");
    let d = root.join("sysroot/etc/logrotate.d");
    let app = fs::read_to_string(d.join("managed-notify.conf")).unwrap();
    assert!(app.contains(concat!(
        "    postrotate\n",
        "cat <<EOF > /run/notify.stamp\n",
        "rotated\n",
        "EOF\n",
        "    endscript\n",
    )));
}
