use std::path::Path;
use std::process::{Command, Output};

use agentdesk_core::testing::FakeServer;
use serde_json::{Value, json};

fn make_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn agents() -> Value {
    json!([
        { "id": 1, "full_name": "Alice Tan", "email": "alice@example.com", "gender": "female",
          "application_status": "pending", "sales_support_id": null,
          "created_at": "2024-06-28T09:00:00Z" },
        { "id": "2", "full_name": "Siti Aminah", "email": "siti@example.org", "gender": "female",
          "application_status": "approved", "account_status": "active",
          "sales_support_id": "10", "sales_support_name": "Farid", "agreement_sent": 1,
          "created_at": "2024-05-01T09:00:00Z" },
        { "id": 3, "full_name": "Bob Lee", "email": "bob@example.com", "gender": "male",
          "application_status": "rejected", "rejection_reason": "Duplicate application",
          "sales_support_id": 0, "created_at": "2024-03-15T09:00:00Z" }
    ])
}

fn roster() -> Value {
    json!([{ "id": 10, "name": "Farid" }])
}

/// Serves the list endpoints and answers every action with `action_status`.
fn serve(action_status: u16) -> FakeServer {
    FakeServer::start(move |request| {
        let line = request.line.as_str();
        if line.starts_with("GET /admin/agents ") {
            (200, agents().to_string())
        } else if line.starts_with("GET /admin/sales-support ") {
            (200, roster().to_string())
        } else if request.path() == "/admin/agents/agreement-download" {
            (200, json!({ "download_url": "https://files.example.com/a.pdf" }).to_string())
        } else if action_status == 200 {
            (200, "{}".to_string())
        } else {
            (action_status, json!({ "message": "Backend exploded" }).to_string())
        }
    })
    .expect("fake server")
}

fn run_cli(home: &Path, server: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agentdesk"))
        .args(args)
        .env("HOME", home)
        .env("AGENTDESK_SERVER_URL", server)
        .env_remove("AGENTDESK_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("run agentdesk")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn list_json_applies_filters() {
    let home = make_home();
    let server = serve(200);
    let output = run_cli(
        home.path(),
        server.base_url(),
        &["list", "--filter", "sales_support_id=unassigned", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let records: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    let ids: Vec<i64> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn views_show_counts() {
    let home = make_home();
    let server = serve(200);
    let output = run_cli(home.path(), server.base_url(), &["views"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let pending = text.lines().find(|l| l.contains(" pending ")).unwrap();
    assert!(pending.trim_end().ends_with('1'));
    assert!(text.contains("support-10"));
}

#[test]
fn reject_sends_one_request() {
    let home = make_home();
    let server = serve(200);
    let output = run_cli(
        home.path(),
        server.base_url(),
        &["reject", "1", "--reason", "Incomplete documentation"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Agent #1 rejected"));

    let posts: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|r| r.method() == "POST")
        .collect();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].path(), "/admin/agents/reject");
    let body = posts[0].json();
    assert_eq!(body["rejection_reason"], "Incomplete documentation");
    assert_eq!(body["reviewed_by"], "admin");
}

#[test]
fn backend_failure_exits_non_zero() {
    let home = make_home();
    let server = serve(500);
    let output = run_cli(home.path(), server.base_url(), &["send-agreement", "2"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Failed to send agreement to agent #2"), "stderr: {err}");
    assert!(err.contains("Backend exploded"));
}

#[test]
fn invalid_reason_is_refused_without_request() {
    let home = make_home();
    let server = serve(200);
    let output = run_cli(home.path(), server.base_url(), &["reject", "1", "--reason", "Looks shady"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown rejection reason"));
    assert!(server.requests().iter().all(|r| r.method() == "GET"));
}

#[test]
fn export_writes_csv() {
    let home = make_home();
    let out = home.path().join("exports");
    let server = serve(200);
    let output = run_cli(
        home.path(),
        server.base_url(),
        &["export", "--view", "female", "--out", out.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let file = std::fs::read_dir(&out)
        .unwrap()
        .next()
        .expect("one csv file")
        .unwrap()
        .path();
    let name = file.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("agents-") && name.ends_with(".csv"));
    let csv = std::fs::read_to_string(file).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("ID,Full Name,"));
}

#[test]
fn export_of_empty_view_fails() {
    let home = make_home();
    let server = serve(200);
    let output = run_cli(
        home.path(),
        server.base_url(),
        &["export", "--search", "zzz", "--out", home.path().to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No data to export"));
}

#[test]
fn config_set_persists_to_home() {
    let home = make_home();
    let output = run_cli(
        home.path(),
        "http://127.0.0.1:9",
        &[
            "config",
            "--reviewer",
            "ops-lead",
            "--timeout-secs",
            "20",
            "--max-document-bytes",
            "2048",
            "--approve-notes",
            "Approved by ops",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let path = home.path().join(".config").join("agentdesk").join("agentdesk.toml");
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("name = \"ops-lead\""));
    assert!(content.contains("timeout_secs = 20"));
    assert!(content.contains("max_document_bytes = 2048"));
    assert!(content.contains("approve_notes = \"Approved by ops\""));
    // Environment overrides are shown but never written back.
    assert!(!content.contains("127.0.0.1:9"));
}
