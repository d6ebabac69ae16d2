//! E2E CLI tests covering:
//! - `wave list` and `wave show` against local and remote-shaped post documents
//! - `--source` selection (local, remote, literal path)
//! - Error codes for missing posts and malformed documents
//! - `wave comments` envelope unwrapping
//! - `wave config show` layering
//! - Diagnostic records written per load
//!
//! Each test runs the `wave` binary as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Build a Command targeting the wave binary, rooted in `dir`.
fn wave_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wave"));
    cmd.current_dir(dir);
    cmd.env("WAVE_LOG", "error");
    cmd.env_remove("RUST_BACKTRACE");
    cmd.env_remove("RUST_LIB_BACKTRACE");
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("FORMAT");
    cmd.env_remove("GOOGLE_GENAI_API_KEY");
    cmd
}

fn copy_fixture(dir: &Path, name: &str, dest: &str) {
    let dest = dir.join(dest);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::copy(Path::new(FIXTURES).join(name), dest).expect("copy fixture");
}

/// A project with the sample post document at the default local path and a
/// remote source pointing at a second local file.
fn setup_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    copy_fixture(dir.path(), "wave-data.json", "data/wave-data.json");
    copy_fixture(dir.path(), "remote-posts.json", "data/remote-posts.json");
    copy_fixture(dir.path(), "comments.json", "comments.json");
    copy_fixture(dir.path(), "broken.json", "broken.json");
    fs::create_dir_all(dir.path().join(".wave")).expect("create .wave");
    fs::write(
        dir.path().join(".wave/config.toml"),
        "[sources]\nremote = \"data/remote-posts.json\"\n",
    )
    .expect("write config");
    dir
}

fn json_stdout(dir: &Path, args: &[&str]) -> Value {
    let output = wave_cmd(dir).args(args).output().expect("wave should not crash");
    assert!(
        output.status.success(),
        "wave {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

#[test]
fn list_json_reports_posts_with_comment_counts() {
    let dir = setup_project();
    let json = json_stdout(dir.path(), &["list", "--json"]);
    let rows = json.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "1");
    assert_eq!(rows[0]["title"], "Sample Wave Post");
    assert_eq!(rows[0]["comments"], 1);
    assert_eq!(rows[1]["comments"], 0);
}

#[test]
fn list_limit_truncates() {
    let dir = setup_project();
    let json = json_stdout(dir.path(), &["list", "-n", "1", "--json"]);
    assert_eq!(json.as_array().expect("array").len(), 1);
}

#[test]
fn list_text_is_tab_separated() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "text", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tSample Wave Post\t1"));
}

#[test]
fn show_sample_post_has_john_doe_comment() {
    let dir = setup_project();
    let json = json_stdout(dir.path(), &["show", "1", "--json"]);
    assert_eq!(json["title"], "Sample Wave Post");
    assert_eq!(json["content"], "This is a sample wave post content.");
    let comments = json["comments"].as_array().expect("comments array");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["author"], "John Doe");
    assert_eq!(comments[0]["text"], "Great post!");
}

#[test]
fn show_pretty_prints_comment_section() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "pretty", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Comments (1)"))
        .stdout(predicate::str::contains("John Doe: Great post!"));
}

#[test]
fn show_unknown_post_fails_with_code() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "text", "show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E4001]"))
        .stderr(predicate::str::contains("wave list"));
}

#[test]
fn show_unknown_post_json_error() {
    let dir = setup_project();
    let output = wave_cmd(dir.path())
        .args(["show", "missing", "--json"])
        .output()
        .expect("wave should not crash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let start = stderr.find('{').expect("json error on stderr");
    let end = stderr.rfind('}').expect("json error end");
    let json: Value = serde_json::from_str(&stderr[start..=end]).expect("valid error JSON");
    assert_eq!(json["error"]["error_code"], "E4001");
}

#[test]
fn remote_source_unwraps_envelope_comments() {
    let dir = setup_project();
    let json = json_stdout(dir.path(), &["--source", "remote", "show", "r1", "--json"]);
    let comments = json["comments"].as_array().expect("comments array");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], "c1");
    assert_eq!(comments[0]["author"], "Ann");
    assert_eq!(comments[0]["text"], "First!");
    assert_eq!(comments[1]["author"], "Bo");
}

#[test]
fn literal_source_path_is_read() {
    let dir = setup_project();
    let json = json_stdout(
        dir.path(),
        &["--source", "data/remote-posts.json", "list", "--json"],
    );
    assert_eq!(json[0]["id"], "r1");
}

#[test]
fn missing_source_is_fetch_error() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "text", "--source", "nope.json", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));
}

#[test]
fn malformed_source_is_parse_error() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "text", "--source", "broken.json", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"));
}

#[test]
fn empty_document_lists_nothing() {
    let dir = setup_project();
    fs::write(dir.path().join("empty.json"), "[]").expect("write");
    wave_cmd(dir.path())
        .args(["--format", "text", "--source", "empty.json", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts in"));
}

// ---------------------------------------------------------------------------
// comments
// ---------------------------------------------------------------------------

#[test]
fn comments_file_unwraps_envelopes() {
    let dir = setup_project();
    let json = json_stdout(dir.path(), &["comments", "--file", "comments.json", "--json"]);
    let comments = json.as_array().expect("array");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["author"], "Ann");
    assert_eq!(comments[0]["text"], "Hello there");
}

#[test]
fn comments_broken_file_is_parse_error() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "text", "comments", "--file", "broken.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"));
}

#[test]
fn comments_without_source_asks_for_flag() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "text", "comments"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --file or --from"));
}

#[test]
fn comments_uses_configured_document() {
    let dir = setup_project();
    fs::write(
        dir.path().join(".wave/config.toml"),
        "[sources]\ncomments = \"comments.json\"\n",
    )
    .expect("write config");
    wave_cmd(dir.path())
        .args(["--format", "pretty", "comments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bo: Second comment"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_show_reflects_project_overrides() {
    let dir = setup_project();
    let json = json_stdout(dir.path(), &["config", "show", "--json"]);
    assert_eq!(json["config"]["sources"]["remote"], "data/remote-posts.json");
    assert_eq!(json["config"]["sources"]["local"], "data/wave-data.json");
    assert_eq!(json["config"]["ui"]["author"], "CurrentUser");
}

#[test]
fn config_show_project_prints_raw_file() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["--format", "text", "config", "show", "--project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remote = \"data/remote-posts.json\""))
        .stdout(predicate::str::contains("author").not());
}

#[test]
fn invalid_config_is_reported() {
    let dir = setup_project();
    fs::write(dir.path().join(".wave/config.toml"), "[sources\n").expect("write config");
    wave_cmd(dir.path())
        .args(["--format", "text", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E3001]"));
}

// ---------------------------------------------------------------------------
// diagnostics
// ---------------------------------------------------------------------------

#[test]
fn loads_write_diagnostic_records() {
    let dir = setup_project();
    wave_cmd(dir.path()).args(["list", "--json"]).assert().success();
    wave_cmd(dir.path()).args(["list", "--json"]).assert().success();

    let diag = dir.path().join(".wave/diagnostics");
    let first: Value =
        serde_json::from_str(&fs::read_to_string(diag.join("log.json")).expect("log.json"))
            .expect("record JSON");
    assert_eq!(first["type"], "dataLoad");
    assert_eq!(first["posts"], 2);
    assert!(diag.join("log (1).json").exists());
}

#[test]
fn diagnostics_can_be_disabled() {
    let dir = setup_project();
    fs::write(
        dir.path().join(".wave/config.toml"),
        "[diagnostics]\nenabled = false\n",
    )
    .expect("write config");
    wave_cmd(dir.path()).args(["list", "--json"]).assert().success();
    assert!(!dir.path().join(".wave/diagnostics").exists());
}

#[test]
fn completions_generate_for_bash() {
    let dir = setup_project();
    wave_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wave"));
}
