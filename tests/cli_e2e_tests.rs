//! End-to-End Tests for the Eyeshade CLI binary.
//!
//! Every test points `--config` into a temporary directory so the user's
//! real settings are never touched.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn eyeshade(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("eyeshade").unwrap();
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

fn temp_config() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user-config.json");
    (dir, path)
}

// ============================================================================
// Config Commands
// ============================================================================

#[test]
fn config_path_prints_override() {
    let (_dir, path) = temp_config();

    eyeshade(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user-config.json"));
}

#[test]
fn config_show_prints_defaults() {
    let (_dir, path) = temp_config();

    eyeshade(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("作業時間: 00:45:00"))
        .stdout(predicate::str::contains("休憩時間: 00:04:00"));
}

#[test]
fn config_set_persists_between_runs() {
    let (_dir, path) = temp_config();

    eyeshade(&path)
        .args(["config", "set", "--work", "30", "--auto-pause", "off"])
        .assert()
        .success();
    assert!(path.exists());

    eyeshade(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("作業時間: 00:30:00"))
        .stdout(predicate::str::contains("離席時に自動一時停止: off"));
}

#[test]
fn config_set_rejects_out_of_range_volume() {
    let (_dir, path) = temp_config();

    eyeshade(&path)
        .args(["config", "set", "--volume", "150"])
        .assert()
        .failure();
    assert!(!path.exists());
}

#[test]
fn config_set_without_options_fails() {
    let (_dir, path) = temp_config();

    eyeshade(&path)
        .args(["config", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("エラー"));
}

// ============================================================================
// Run Command
// ============================================================================

#[test]
fn run_reads_console_commands_until_quit() {
    let (_dir, path) = temp_config();

    eyeshade(&path)
        .arg("run")
        .write_stdin("pause\nstatus\nset volume 40\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("一時停止しました"))
        .stdout(predicate::str::contains("状態: 作業中"));

    eyeshade(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("音量: 40"));
}

#[test]
fn run_exits_at_end_of_input() {
    let (_dir, path) = temp_config();

    eyeshade(&path).arg("run").write_stdin("").assert().success();
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn completions_generate_script() {
    let (_dir, path) = temp_config();

    eyeshade(&path)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eyeshade"));
}
