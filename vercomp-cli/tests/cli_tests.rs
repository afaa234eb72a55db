//! `vercomp` binary tests: config failures, and full runs against a loopback Jira stub.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::{json, Value};
use tempfile::TempDir;

fn vercomp_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vercomp"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("VERCOMP_TOKEN")
        .env_remove("VERCOMP_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, base_url: &str, extra: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    let contents = format!(
        "base_url: {base_url}\nauth:\n  method: token\n  token: pat-123\nsource_project: SRC\ndest_project: DEST\nversions: all\n{extra}"
    );
    std::fs::write(&path, contents).expect("write config");
    path
}

/// Serve `responses` in order, one connection each; yields `METHOD path` per request.
fn serve(responses: Vec<(u16, Value)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body_bytes = vec![0u8; content_length];
            reader.read_exact(&mut body_bytes).expect("body");

            let payload = body.to_string();
            let response = format!(
                "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                payload.len()
            );
            let mut stream = stream;
            stream.write_all(response.as_bytes()).expect("write");
            stream.flush().expect("flush");

            let mut parts = request_line.split_whitespace();
            seen.push(format!(
                "{} {}",
                parts.next().unwrap_or_default(),
                parts.next().unwrap_or_default()
            ));
        }
        seen
    });
    (base, handle)
}

fn login_and_projects() -> Vec<(u16, Value)> {
    vec![
        (200, json!({ "key": "jdoe", "name": "jdoe" })),
        (200, json!({ "key": "SRC", "id": "100" })),
        (200, json!({ "key": "DEST", "id": "200" })),
    ]
}

fn source_versions() -> Value {
    json!([{
        "self": "http://jira/rest/api/2/version/1", "id": "1", "name": "1.0",
        "description": "first", "archived": false, "released": false, "projectId": 100
    }])
}

// ---------------------------------------------------------------------------
// 1. Failures before any network call
// ---------------------------------------------------------------------------

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().expect("home");
    vercomp_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("clone"))
        .stdout(contains("check"));
}

#[test]
fn missing_default_config_is_reported() {
    let home = TempDir::new().expect("home");
    vercomp_cmd(home.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("config not found"))
        .stderr(contains(".vercomp"));
}

#[test]
fn invalid_project_key_fails_before_connecting() {
    let home = TempDir::new().expect("home");
    let config = write_config(&home, "http://127.0.0.1:1", "");
    let contents = std::fs::read_to_string(&config)
        .expect("read")
        .replace("source_project: SRC", "source_project: src-proj");
    std::fs::write(&config, contents).expect("write");

    vercomp_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["clone", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains("source_project"));
}

#[test]
fn unreachable_server_fails_at_login() {
    let home = TempDir::new().expect("home");
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let config = write_config(&home, &format!("http://127.0.0.1:{port}"), "");

    vercomp_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("failed to log in"));
}

// ---------------------------------------------------------------------------
// 2. Runs against the stub
// ---------------------------------------------------------------------------

#[test]
fn check_reports_user_and_projects() {
    let home = TempDir::new().expect("home");
    let (base, server) = serve(login_and_projects());
    let config = write_config(&home, &base, "components: [Backend]\n");

    vercomp_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .arg("check")
        .assert()
        .success()
        .stdout(contains("as jdoe"))
        .stdout(contains("SRC -> DEST"))
        .stdout(contains("components: 1 named"));

    let seen = server.join().expect("server");
    assert_eq!(
        seen,
        [
            "GET /rest/api/2/myself",
            "GET /rest/api/2/project/SRC",
            "GET /rest/api/2/project/DEST",
        ]
    );
}

#[test]
fn dry_run_json_reports_would_create_without_writing() {
    let home = TempDir::new().expect("home");
    let mut responses = login_and_projects();
    responses.push((200, source_versions()));
    responses.push((200, json!([])));
    let (base, server) = serve(responses);
    let config = write_config(&home, &base, "");

    let output = vercomp_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["clone", "--dry-run", "--json"])
        .output()
        .expect("run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["dry_run"], json!(true));
    assert_eq!(report["kinds"][0]["kind"], json!("version"));
    assert_eq!(
        report["kinds"][0]["results"][0],
        json!({ "outcome": "would_create", "name": "1.0" })
    );

    let seen = server.join().expect("server");
    assert!(seen.iter().all(|r| r.starts_with("GET ")), "got: {seen:?}");
    assert_eq!(seen.len(), 5);
}

#[test]
fn clone_creates_then_updates_missing_version() {
    let home = TempDir::new().expect("home");
    let mut responses = login_and_projects();
    responses.push((200, source_versions()));
    responses.push((200, json!([])));
    responses.push((
        201,
        json!({ "self": "http://jira/rest/api/2/version/9", "id": "9", "name": "1.0",
                "archived": false, "released": false, "projectId": 200 }),
    ));
    responses.push((
        200,
        json!({ "self": "http://jira/rest/api/2/version/9", "id": "9", "name": "1.0",
                "description": "first", "archived": false, "released": false, "projectId": 200 }),
    ));
    let (base, server) = serve(responses);
    let config = write_config(&home, &base, "");

    vercomp_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .arg("clone")
        .assert()
        .success()
        .stdout(contains("versions"))
        .stdout(contains("1.0"));

    let seen = server.join().expect("server");
    assert_eq!(
        &seen[3..],
        [
            "GET /rest/api/2/project/SRC/versions",
            "GET /rest/api/2/project/DEST/versions",
            "POST /rest/api/2/version",
            "PUT /rest/api/2/version/9",
        ]
    );
}

#[test]
fn failed_entity_exits_non_zero_with_summary() {
    let home = TempDir::new().expect("home");
    let mut responses = login_and_projects();
    responses.push((200, source_versions()));
    responses.push((200, json!([])));
    responses.push((
        400,
        json!({ "errors": { "name": "A version with this name already exists in this project." } }),
    ));
    let (base, server) = serve(responses);
    let config = write_config(&home, &base, "");

    vercomp_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .arg("clone")
        .assert()
        .failure()
        .stdout(contains("already exists"))
        .stderr(contains("1 entity could not be copied from SRC to DEST"));

    server.join().expect("server");
}
