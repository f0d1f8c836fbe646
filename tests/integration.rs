use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn askcorp_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("askcorp");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(files_dir.join("handbook.pdf"), b"%PDF-1.4 handbook").unwrap();
    fs::write(files_dir.join("notes.txt"), "plain text notes").unwrap();

    let config_content = format!(
        r#"[storage]
path = "{}/data/askcorp.sqlite"

[timing]
index_delay_ms = 50
progress_hide_ms = 10
toast_display_ms = 20
toast_exit_ms = 5
"#,
        root.display()
    );

    let config_path = root.join("askcorp.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_askcorp(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = askcorp_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run askcorp binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run the binary off the async runtime so mock servers keep serving.
async fn run_askcorp_async(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let config_path = config_path.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_askcorp(&config_path, &args)
    })
    .await
    .unwrap()
}

async fn mock_services() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let blob_url = format!("{}/blob", base);

    let router = Router::new()
        .route(
            "/presign",
            post(move |Json(_): Json<Value>| {
                let blob_url = blob_url.clone();
                async move { Json(json!({"url": blob_url})) }
            }),
        )
        .route("/blob", put(|| async { "" }))
        .route(
            "/query",
            post(|Json(body): Json<Value>| async move {
                let question = body["query"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "response": format!("You asked: {}\n\nSee <the handbook>.", question),
                    "sources": [{"document": "handbook.pdf", "page_number": 0}]
                }))
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

#[test]
fn test_settings_defaults() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_askcorp(&config, &["settings"]);
    assert!(success, "settings failed: {}", stderr);
    assert!(stdout.contains("query_url:   (not set)"));
    assert!(stdout.contains("model:       claude-3-5-sonnet-20241022"));
    assert!(stdout.contains("badge:       claude-3-5-sonnet"));
}

#[test]
fn test_settings_set_trims_and_persists() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_askcorp(
        &config,
        &[
            "settings",
            "set",
            "--query-url",
            "  https://rag.example.com/query  ",
            "--model",
            "claude-3-haiku-20240307",
        ],
    );
    assert!(success, "settings set failed: {}", stderr);

    let (stdout, _, success) = run_askcorp(&config, &["settings"]);
    assert!(success);
    assert!(stdout.contains("query_url:   https://rag.example.com/query\n"));
    assert!(stdout.contains("presign_url: (not set)"));
    assert!(stdout.contains("badge:       claude-3-haiku\n"));
}

#[test]
fn test_docs_empty() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, success) = run_askcorp(&config, &["docs"]);
    assert!(success);
    assert!(stdout.contains("No documents uploaded yet."));
}

#[test]
fn test_upload_rejects_non_pdf() {
    let (tmp, config) = setup_test_env();
    let txt = tmp.path().join("files/notes.txt");
    let (_, stderr, success) = run_askcorp(&config, &["upload", txt.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Only PDF files are supported"));

    let (stdout, _, _) = run_askcorp(&config, &["docs"]);
    assert!(stdout.contains("No documents uploaded yet."));
}

#[test]
fn test_upload_without_presign_endpoint() {
    let (tmp, config) = setup_test_env();
    let pdf = tmp.path().join("files/handbook.pdf");
    let (_, stderr, success) = run_askcorp(&config, &["upload", pdf.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("no presign endpoint configured"));
    assert!(stderr.contains("askcorp settings set"));
}

#[test]
fn test_upload_missing_file() {
    let (tmp, config) = setup_test_env();
    let missing = tmp.path().join("files/missing.pdf");
    let (_, stderr, success) = run_askcorp(&config, &["upload", missing.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("cannot read"));
}

#[test]
fn test_ask_without_query_endpoint() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_askcorp(&config, &["ask", "What is covered?"]);
    assert!(!success);
    assert!(stderr.contains("no query endpoint configured"));
}

#[test]
fn test_ask_empty_question() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_askcorp(&config, &["ask", "   "]);
    assert!(!success);
    assert!(stderr.contains("question is empty"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let binary = askcorp_binary();
    let output = Command::new(&binary)
        .current_dir(tmp.path())
        .args(["--config", "does-not-exist.toml", "docs"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(tmp.path().join("data/askcorp.sqlite").exists());
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("askcorp.toml");
    fs::write(&config, "[storage]\npath = \"\"\n").unwrap();
    let (_, stderr, success) = run_askcorp(&config, &["docs"]);
    assert!(!success);
    assert!(!stderr.is_empty());
}

#[test]
fn test_completions() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, success) = run_askcorp(&config, &["completions", "bash"]);
    assert!(success);
    assert!(stdout.contains("askcorp"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_upload_and_ask_end_to_end() {
    let (tmp, config) = setup_test_env();
    let base = mock_services().await;

    let presign = format!("{}/presign", base);
    let query = format!("{}/query", base);
    let (_, stderr, success) = run_askcorp_async(
        &config,
        &["settings", "set", "--presign-url", &presign, "--query-url", &query],
    )
    .await;
    assert!(success, "settings set failed: {}", stderr);

    let pdf = tmp.path().join("files/handbook.pdf");
    let txt = tmp.path().join("files/notes.txt");
    let (stdout, stderr, success) = run_askcorp_async(
        &config,
        &["upload", pdf.to_str().unwrap(), txt.to_str().unwrap()],
    )
    .await;
    assert!(success, "upload failed: {}", stderr);
    assert!(stdout.contains("skipped  notes.txt"));
    assert!(stdout.contains("uploaded handbook.pdf"));

    // upload waits for indexing before exiting
    let (stdout, _, success) = run_askcorp_async(&config, &["docs"]).await;
    assert!(success);
    assert!(stdout.contains("DOCUMENTS (1)  indexed: 1"));
    assert!(stdout.contains("handbook.pdf"));

    let (stdout, stderr, success) = run_askcorp_async(&config, &["ask", "vacation days?"]).await;
    assert!(success, "ask failed: {}", stderr);
    assert!(stdout.contains("You asked: vacation days?"));
    assert!(stdout.contains("[1] handbook.pdf · Page 0"));

    let (stdout, _, success) =
        run_askcorp_async(&config, &["ask", "vacation days?", "--html"]).await;
    assert!(success);
    assert!(stdout.contains("<p>You asked: vacation days?</p>"));
    assert!(stdout.contains("See &lt;the handbook&gt;."));
    assert!(stdout.contains("Page 0"));
}
