//! Shared test helpers for intellimerge CLI integration tests.
//!
//! All tests use temp directories, no side effects on the real checkout.
//! The config and log env vars are cleared so the developer's environment
//! cannot leak into a run.

#![allow(dead_code)]

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// A fresh, empty project directory.
pub fn setup_project() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// Write `content` to `dir/name`, returning the full path.
pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("failed to write fixture");
    path
}

/// Read `dir/name` back.
pub fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).expect("failed to read file")
}

fn command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_intellimerge"));
    cmd.args(args)
        .current_dir(dir)
        .env_remove("INTELLIMERGE_CONFIG")
        .env_remove("INTELLIMERGE_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Run intellimerge in `dir`.
pub fn im_in(dir: &Path, args: &[&str]) -> Output {
    command(dir, args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to execute intellimerge")
}

/// Run intellimerge in `dir` with `input` on stdin.
pub fn im_with_stdin(dir: &Path, args: &[&str], input: &str) -> Output {
    let mut child = command(dir, args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn intellimerge");
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child
        .wait_with_output()
        .expect("failed to wait for intellimerge")
}

/// Assert success; returns (stdout, stderr).
pub fn assert_ok(out: &Output, args: &[&str]) -> (String, String) {
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        out.status.success(),
        "intellimerge {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    (stdout, stderr)
}

/// Run intellimerge and assert it succeeds. Returns stdout as string.
pub fn im_ok(dir: &Path, args: &[&str]) -> String {
    assert_ok(&im_in(dir, args), args).0
}

/// Run intellimerge and assert it fails. Returns stderr as string.
pub fn im_fails(dir: &Path, args: &[&str]) -> String {
    let out = im_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected intellimerge {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}
