use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;
use docubot::config::ServerConfig;

/// Server config pointing at a mock server
#[allow(dead_code)]
pub fn server_config(uri: &str) -> ServerConfig {
    ServerConfig {
        base_url: uri.to_string(),
        api_prefix: "/api/v1/rag".to_string(),
        timeout_seconds: 5,
    }
}

/// Write a minimal PDF into a temp dir
#[allow(dead_code)]
pub fn temp_pdf(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\n%%EOF\n").expect("failed to write pdf");
    (temp_dir, path)
}

/// `docubot` command isolated from the caller's environment and config
///
/// The returned `TempDir` must outlive the command.
#[allow(dead_code)]
pub fn docubot_cmd(base_url: &str) -> (Command, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let mut cmd = Command::cargo_bin("docubot").expect("binary should build");
    cmd.arg("--config")
        .arg(temp_dir.path().join("missing.yaml"))
        .arg("--base-url")
        .arg(base_url)
        .env_remove("DOCUBOT_BASE_URL")
        .env_remove("DOCUBOT_API_PREFIX")
        .env_remove("DOCUBOT_TIMEOUT_SECONDS")
        .env_remove("DOCUBOT_SUCCESS_DISPLAY_MS")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    (cmd, temp_dir)
}
