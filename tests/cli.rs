//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::Utc;
use hashsync::cassette::format::{Cassette, Interaction};
use serde_json::{json, Value};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hashsync_cli_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("posts")).unwrap();
    dir
}

fn hashsync(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hashsync"));
    cmd.current_dir(dir);
    for var in [
        "HASHNODE_ACCESS_TOKEN",
        "HASHNODE_PUBLICATION_ID",
        "HASHNODE_PUBLICATION_HOST",
        "HASHNODE_API_URL",
        "HASHSYNC_POSTS_DIR",
        "HASHSYNC_RECORD",
        "HASHSYNC_REPLAY",
        "GITHUB_OUTPUT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run hashsync binary")
}

fn write_cassette(path: &Path, calls: &[(&str, Value, Value)]) {
    let cassette = Cassette {
        name: "cli".into(),
        recorded_at: Utc::now(),
        publication: "blog.test".into(),
        interactions: calls
            .iter()
            .enumerate()
            .map(|(seq, (method, input, output))| Interaction {
                seq: seq as u64,
                port: "remote".into(),
                method: (*method).into(),
                input: input.clone(),
                output: output.clone(),
            })
            .collect(),
    };
    std::fs::write(path, serde_yaml::to_string(&cassette).unwrap()).unwrap();
}

fn publish_args(cmd: &mut Command) -> &mut Command {
    cmd.args([
        "publish",
        "--access-token",
        "tok",
        "--publication-id",
        "pub-1",
        "--publication-host",
        "blog.test",
        "--posts-directory",
        "posts",
    ])
}

#[test]
fn help_succeeds() {
    let dir = scratch("help");
    let output = run(hashsync(&dir).arg("--help"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("publish"));
    assert!(stdout.contains("check"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let dir = scratch("invalid");
    let output = run(hashsync(&dir).arg("nonsense"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn check_lists_what_publish_would_do() {
    let dir = scratch("check");
    std::fs::write(dir.join("posts/a.md"), "---\ntitle: A\nslug: a\ntags: Rust\n---\nbody").unwrap();
    std::fs::write(dir.join("posts/b.md"), "no frontmatter").unwrap();

    let output = run(hashsync(&dir).arg("check"));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("publish a"));
    assert!(stdout.contains("tags: rust"));
    assert!(stdout.contains("skip (No frontmatter found)"));
    assert!(stdout.contains("2 file(s) checked."));
}

#[test]
fn check_fails_on_invalid_frontmatter() {
    let dir = scratch("check_invalid");
    std::fs::write(dir.join("posts/a.md"), "---\ntitle: [oops\n---\n").unwrap();

    let output = run(hashsync(&dir).arg("check"));
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("1 file(s) have invalid frontmatter"));
}

#[test]
fn publish_without_token_fails() {
    let dir = scratch("no_token");
    let output = run(hashsync(&dir).args(["publish", "--publication-id", "pub-1"]));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("access-token is required"));
}

#[test]
fn replayed_publish_writes_outputs_and_report() {
    let dir = scratch("replay");
    std::fs::write(dir.join("posts/hello.md"), "---\ntitle: Hello\nslug: hello\n---\nbody").unwrap();
    let post = json!({ "id": "p1", "title": "Hello", "slug": "hello", "url": "https://blog.test/hello" });
    write_cassette(
        &dir.join("publish.yaml"),
        &[
            ("fetch_post_by_slug", json!({ "slug": "hello" }), json!({ "Ok": post })),
            ("update_post", json!({ "id": "p1", "slug": "hello" }), json!({ "Ok": post })),
        ],
    );
    let github_output = dir.join("github_output");

    let output = run(publish_args(&mut hashsync(&dir))
        .args(["--summary-json", "report.json"])
        .env("HASHSYNC_REPLAY", dir.join("publish.yaml"))
        .env("GITHUB_OUTPUT", &github_output));

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let outputs = std::fs::read_to_string(&github_output).unwrap();
    assert!(outputs.contains("updated=1\n"));
    assert!(outputs.contains("failed=0\n"));
    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["summary"]["updated"], 1);
    assert_eq!(report["files"][0]["outcome"]["status"], "updated");
    assert_eq!(report["files"][0]["outcome"]["url"], "https://blog.test/hello");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_mutation_makes_exit_non_zero() {
    let dir = scratch("replay_fail");
    std::fs::write(dir.join("posts/hello.md"), "---\ntitle: Hello\nslug: hello\n---\nbody").unwrap();
    write_cassette(
        &dir.join("publish.yaml"),
        &[
            ("fetch_post_by_slug", json!({ "slug": "hello" }), json!({ "Ok": null })),
            ("fetch_publication_snapshot", Value::Null, json!({ "Ok": null })),
            ("create_post", json!({ "slug": "hello" }), json!({ "Err": "rate limited" })),
        ],
    );
    let github_output = dir.join("github_output");

    let output = run(publish_args(&mut hashsync(&dir))
        .env("HASHSYNC_REPLAY", dir.join("publish.yaml"))
        .env("GITHUB_OUTPUT", &github_output));
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("1 post(s) failed to process"));
    assert!(stderr.contains("rate limited"));
    assert!(std::fs::read_to_string(&github_output).unwrap().contains("failed=1\n"));
    let _ = std::fs::remove_dir_all(&dir);
}
