//! End-to-end tests of the command router; network calls only reach a local mock server

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ufetch(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ufetch").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("UFETCH_CONFIG")
        .env_remove("UFETCH_BRANCH")
        .env("HOME", dir.path())
        .arg("--no-color");
    cmd
}

fn is_empty_dir(dir: &TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "UniFetch version {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch-source"))
        .stdout(predicate::str::contains("ufetch ghdocs user/repo"));
}

#[test]
fn test_update_is_not_implemented() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("not implemented"));
}

#[test]
fn test_unknown_command_fails() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .arg("foo")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("foo"));
}

#[test]
fn test_missing_argument_fails() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir).arg("npm").assert().code(2);
}

#[test]
fn test_github_identifier_without_slash() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .args(["gh", "octocat"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("owner/repo"));
    assert!(is_empty_dir(&dir));
}

#[test]
fn test_invalid_package_name() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .args(["fetch-npm", "../escape"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid npm package name"));
    assert!(is_empty_dir(&dir));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .args(["gh", "octocat/Hello-World", "--config", "missing.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_build_missing_file() {
    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .args(["build", "missing.c"])
        .assert()
        .success()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_build_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    ufetch(&dir)
        .args(["build", "notes.txt"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No compiler found for .txt"));
}

#[test]
fn test_pypi_release_without_files_exits_cleanly() {
    let mut server = mockito::Server::new();
    let metadata = server
        .mock("GET", "/pypi/demo/json")
        .with_status(200)
        .with_body(r#"{"info": {"version": "1.0"}, "urls": []}"#)
        .create();

    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("system_proxy = false\n\n[endpoints]\npypi = \"{}\"\n", server.url()),
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    ufetch(&dir)
        .args(["pypi", "demo", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("No files found for this PyPI package"));

    metadata.assert();
    assert!(is_empty_dir(&dir));
}
