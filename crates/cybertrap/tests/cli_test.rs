//! Integration tests for the `cybertrap` CLI binary.
//!
//! Parsing, help, completions and error exits run without a backend;
//! the rest point `--api-url` at a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `cybertrap` with env isolation: no `CYBERTRAP_*` vars and config
/// directories pointed at a nonexistent path.
fn cybertrap_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cybertrap");
    cmd.env("HOME", "/tmp/cybertrap-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/cybertrap-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("CYBERTRAP_PROFILE")
        .env_remove("CYBERTRAP_API_URL")
        .env_remove("CYBERTRAP_TOKEN")
        .env_remove("CYBERTRAP_OUTPUT")
        .env_remove("CYBERTRAP_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Same, already aimed at `url` with a bearer token.
fn backend_cmd(url: &str) -> assert_cmd::Command {
    let mut cmd = cybertrap_cmd();
    cmd.args(["--api-url", url, "--token", "test-token", "--yes"]);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_domains(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "d1", "domain": "old.com", "uploadedAt": "2024-01-01T00:00:00Z"},
            {"id": "d2", "domain": "new.com", "uploadedAt": "2024-06-01T00:00:00Z"},
            {"id": "d3", "domain": "undated.com"}
        ])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = cybertrap_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    cybertrap_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("domains")
            .and(predicate::str::contains("templates"))
            .and(predicate::str::contains("scans"))
            .and(predicate::str::contains("schedule")),
    );
}

#[test]
fn test_version_flag() {
    cybertrap_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cybertrap"));
}

#[test]
fn test_completions_zsh() {
    cybertrap_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    cybertrap_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_scans_start_requires_targets() {
    let output = cybertrap_cmd().args(["scans", "start"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_all_domains_conflicts_with_templates() {
    let output = cybertrap_cmd()
        .args(["scans", "start", "--all-domains", "--template", "t1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("cannot be used with"), "{text}");
}

#[test]
fn test_invalid_output_format() {
    let output = cybertrap_cmd()
        .args(["--output", "invalid", "domains", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_domains_list_without_config() {
    cybertrap_cmd()
        .args(["domains", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_missing_token_is_auth_error() {
    cybertrap_cmd()
        .args(["--api-url", "http://127.0.0.1:9", "domains", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No token"));
}

#[test]
fn test_unknown_profile() {
    cybertrap_cmd()
        .args(["--profile", "ghost", "domains", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_config_show_no_config() {
    cybertrap_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_unknown_sort_field_lists_choices() {
    cybertrap_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--token",
            "t",
            "domains",
            "list",
            "--sort",
            "bogus",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("uploaded-at"));
}

#[test]
fn test_schedule_date_in_past_rejected() {
    cybertrap_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--token",
            "t",
            "schedule",
            "create",
            "--all-domains",
            "--date",
            "2000-01-01",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("in the past"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_domains_list_json_newest_first() {
    let server = MockServer::start().await;
    mount_domains(&server).await;

    let mut cmd = backend_cmd(&server.uri());
    cmd.args(["--output", "json", "domains", "list", "--all"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["domain"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["new.com", "old.com", "undated.com"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_domains_list_filter_plain() {
    let server = MockServer::start().await;
    mount_domains(&server).await;

    let mut cmd = backend_cmd(&server.uri());
    cmd.args(["--output", "plain", "domains", "list", "--filter-domain", "OLD"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "old.com");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_token_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run({
        let mut cmd = backend_cmd(&server.uri());
        cmd.args(["domains", "list"]);
        cmd
    })
    .await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_domain_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = run({
        let mut cmd = backend_cmd(&server.uri());
        cmd.args(["domains", "add", "not a domain"]);
        cmd
    })
    .await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scan_start_all_templates_payload() {
    let server = MockServer::start().await;
    mount_domains(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "templateId": "dns", "name": "DNS", "type": "dns"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/scans"))
        .and(body_json(json!({
            "domainIds": ["d2"],
            "templateIds": [],
            "scanAllNuclei": true
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/scans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let output = run({
        let mut cmd = backend_cmd(&server.uri());
        cmd.args(["scans", "start", "--domain", "new.com", "--all-templates"]);
        cmd
    })
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Scan started"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scans_get_prints_result_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/scans/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "domainId": "d1",
            "domain": "a.com",
            "templateIds": ["dns"],
            "status": "complete",
            "resultUrls": ["https://results.example.com/s1/dns.json"]
        })))
        .mount(&server)
        .await;

    let output = run({
        let mut cmd = backend_cmd(&server.uri());
        cmd.args(["scans", "get", "s1"]);
        cmd
    })
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("completed"), "{stdout}");
    assert!(stdout.contains("https://results.example.com/s1/dns.json"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_domains_upload_sends_file() {
    let server = MockServer::start().await;
    mount_domains(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/domains/upload-txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("domains.txt");
    std::fs::write(&file, "a.com\nb.com\n").unwrap();

    let output = run({
        let mut cmd = backend_cmd(&server.uri());
        cmd.arg("domains").arg("upload").arg(&file);
        cmd
    })
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_domains_upload_empty_file_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/domains/upload-txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("empty.txt");
    std::fs::write(&file, "\n  \n").unwrap();

    let output = run({
        let mut cmd = backend_cmd(&server.uri());
        cmd.arg("domains").arg("upload").arg(&file);
        cmd
    })
    .await;
    assert!(!output.status.success(), "{}", combined_output(&output));
}
