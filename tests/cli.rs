use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs::write;
use tempfile::TempDir;

fn command() -> Command {
    let mut cmd = Command::cargo_bin("company-infosearcher").expect("Binary exists");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_input(dir: &TempDir) -> String {
    let path = dir.path().join("companies.txt");
    write(&path, "Portugal:\n1- Galp Energia\n2- EDP\n\nSpain:\n1- Inditex\n")
        .expect("Writing input failed");
    path.to_str().unwrap().to_string()
}

#[test]
fn help_lists_the_file_flag() {
    command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--file"));
}

#[test]
fn missing_file_flag_is_a_usage_error() {
    command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn nonexistent_input_file_fails() {
    let dir = TempDir::new().unwrap();
    command()
        .current_dir(dir.path())
        .args(["--file", "missing.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn dry_run_prints_plan_without_api_key() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    command()
        .current_dir(dir.path())
        .args(["--file", input.as_str(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 3 companies"))
        .stdout(predicate::str::contains("3- Inditex"));

    assert!(!dir.path().join(".env").exists());
}

#[test]
fn missing_key_file_is_created_and_run_stops() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let env_file = dir.path().join(".env");

    command()
        .current_dir(dir.path())
        .args(["--file", input.as_str(), "--env-file", env_file.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GEMINI_API_KEY"));

    let content = std::fs::read_to_string(&env_file).unwrap();
    assert!(content.contains("# GEMINI_API_KEY=your_api_key_here"));
    assert!(!dir.path().join("gemini_log.txt").exists());
}

#[test]
fn full_run_against_mock_api_writes_log() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let env_file = dir.path().join("keys.env");
    write(&env_file, "GEMINI_API_KEY=cli-test-key\n").unwrap();
    let output = dir.path().join("out").join("run.txt");

    let server = MockServer::start();
    let base_url = server.base_url();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash-lite:generateContent")
            .header("x-goog-api-key", "cli-test-key");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "\"A company.\" | [Industry]"}]}}]
        }));
    });

    command()
        .current_dir(dir.path())
        .args([
            "--file",
            input.as_str(),
            "--env-file",
            env_file.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--api-base",
            base_url.as_str(),
            "--request-delay-secs",
            "0",
            "--initial-backoff-secs",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 companies processed, 0 failed"));

    api_mock.assert_hits(3);
    let log = std::fs::read_to_string(&output).unwrap();
    assert!(log.contains("Total Companies Processed: 3"));
    assert!(log.contains("=== Portugal ==="));
    assert!(log.contains("3- Inditex - A company. | [Industry]"));
}
