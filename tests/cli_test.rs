//! Drives the `jdd` binary for the one-shot commands.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn jdd(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jdd"));
    cmd.current_dir(dir).args(args);
    for var in ["JDD_ROOT", "JDD_DRY_RUN", "JDD_DELAY", "JDD_EXCLUDE", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd.output().expect("failed to run jdd")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_init_writes_default_config() {
    let temp = TempDir::new().unwrap();

    let output = jdd(temp.path(), &["init"]);

    assert!(output.status.success());
    let written = fs::read_to_string(temp.path().join(".jd.toml")).unwrap();
    assert!(written.contains("dry_run = false"));
    assert!(stdout(&output).contains("Created configuration file"));
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".jd.toml"), "dry_run = true\n").unwrap();

    let refused = jdd(temp.path(), &["init"]);
    assert!(!refused.status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join(".jd.toml")).unwrap(),
        "dry_run = true\n"
    );

    let forced = jdd(temp.path(), &["init", "--force"]);
    assert!(forced.status.success());
    assert!(
        fs::read_to_string(temp.path().join(".jd.toml"))
            .unwrap()
            .contains("dry_run = false")
    );
}

#[test]
fn test_config_shows_file_values_and_flag_overrides() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".jd.toml"),
        "exclude = [\"Inbox/**\"]\ndelay = \"2s\"\n",
    )
    .unwrap();

    let output = jdd(temp.path(), &["config", "--dry-run"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Inbox/**"));
    assert!(text.contains("2s"));
    assert!(text.contains("dry_run = true"));
}

#[test]
fn test_scan_files_documents_and_exits() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("docs");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("15.23 Notes.txt"), "notes").unwrap();
    fs::write(root.join("Untitled.txt"), "other").unwrap();

    let output = jdd(temp.path(), &["scan", "--root", "docs"]);

    assert!(output.status.success(), "{output:?}");
    assert!(root.join("10-19/15/15.23/15.23 Notes.txt").is_file());
    assert!(root.join("Untitled.txt").is_file());
}

#[test]
fn test_scan_missing_root_fails() {
    let temp = TempDir::new().unwrap();

    let output = jdd(temp.path(), &["scan", "--root", "missing"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".jd.toml"), "delay = \"soon\"\n").unwrap();

    let output = jdd(temp.path(), &["config"]);

    assert!(!output.status.success());
}
