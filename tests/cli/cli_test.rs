//! CLI contract tests.

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;

fn quickchat(config_dir: &Path, args: &[&str]) -> Output {
    let mut cmd = match Command::cargo_bin("quickchat") {
        Ok(cmd) => cmd,
        Err(err) => panic!("quickchat binary should build: {err}"),
    };
    cmd.arg("--config")
        .arg(config_dir.join("config.toml"))
        .args(args)
        .env_remove("RUST_LOG");
    match cmd.output() {
        Ok(output) => output,
        Err(err) => panic!("quickchat should run: {err}"),
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn check_prints_confirmations_and_hash() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let output = quickchat(
        tmp.path(),
        &["check", "--to", "+27718693002", "--body", "Hi Mike", "--seq", "3"],
    );
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Cell phone number successfully captured."));
    assert!(out.contains("Message ready to send."));
    assert!(out.contains(":3:HE"));
    assert!(!tmp.path().join("stored_messages.json").exists());
}

#[test]
fn check_rejects_bad_recipient() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let output = quickchat(tmp.path(), &["check", "--to", "08575975889", "--body", "Hi"]);
    assert!(!output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("international code"));
}

#[test]
fn check_rejects_long_body() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let body = "x".repeat(260);
    let output = quickchat(tmp.path(), &["check", "--to", "+27718693002", "--body", &body]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("by 10"));
}

#[test]
fn store_then_list_and_find() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let cell = "+27838884567";
    let long = "Where are you? You are late! I have asked you to be on time.";

    let first = quickchat(tmp.path(), &["store", "--to", cell, "--body", long, "--seq", "2"]);
    assert!(first.status.success());
    assert!(stdout(&first).contains("Message successfully stored."));

    let second = quickchat(
        tmp.path(),
        &["store", "--to", "+27834484567", "--body", "Yohoooo, I am at your gate."],
    );
    assert!(second.status.success());

    let list = quickchat(tmp.path(), &["list"]);
    assert!(list.status.success());
    let out = stdout(&list);
    assert!(out.contains("1. Where are you?"));
    assert!(out.contains("2. Yohoooo, I am at your gate."));
    assert!(out.contains(&format!("Longest message: {long}")));

    let find = quickchat(tmp.path(), &["find", "--to", cell]);
    assert!(find.status.success());
    let out = stdout(&find);
    assert!(out.contains(long));
    assert!(!out.contains("Yohoooo"));
}

#[test]
fn list_on_empty_store() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let output = quickchat(tmp.path(), &["list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No messages available."));
}

#[test]
fn log_to_file_writes_json_events() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let output = quickchat(
        tmp.path(),
        &["--log-to-file", "store", "--to", "+27718693002", "--body", "Logged"],
    );
    assert!(output.status.success());

    let logs_dir = tmp.path().join("logs");
    let entries = std::fs::read_dir(&logs_dir).expect("logs dir created");
    let contents: String = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("quickchat.log"))
        .filter_map(|e| std::fs::read_to_string(e.path()).ok())
        .collect();
    let line = contents
        .lines()
        .find(|l| l.contains("message stored"))
        .expect("store event logged");
    assert!(line.starts_with('{'));
    assert!(line.contains("\"level\":\"INFO\""));
}

#[test]
fn bad_log_level_in_config_is_rejected() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    std::fs::write(
        tmp.path().join("config.toml"),
        "[logging]\nlevel = \"quickchat=loudest\"\n",
    )
    .expect("write config");
    let output = quickchat(tmp.path(), &["list"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid log level"));
}
