use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

const REQUIRED: [(&str, &str); 7] = [
    ("PRIMARY_LLM_API_KEY", "sk-test"),
    ("SECONDARY_LLM_API_KEY", "sk-ant-test"),
    ("EMBEDDING_INDEX_API_KEY", "pc-test"),
    ("EMBEDDING_INDEX_ENVIRONMENT", "us-west1-gcp"),
    ("FAST_INFERENCE_API_KEY", "gsk-test"),
    ("ALT_LLM_API_KEY", "mistral-test"),
    ("SPEECH_SYNTHESIS_API_KEY", "xi-test"),
];

fn switchboard_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_switchboard"));
    cmd.env_clear();
    cmd
}

#[test]
fn test_cli_help() {
    switchboard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hosted AI services"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("load-model"));
}

#[test]
fn test_cli_version() {
    switchboard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("switchboard"));
}

#[test]
fn test_invalid_subcommand() {
    switchboard_cmd().arg("invalid-command").assert().failure();
}

#[test]
fn test_config_check_names_missing_credential() {
    switchboard_cmd()
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PRIMARY_LLM_API_KEY"));
}

#[test]
fn test_config_check_passes_with_required_credentials() {
    switchboard_cmd()
        .envs(REQUIRED)
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_generate_fails_fast_without_credentials() {
    switchboard_cmd()
        .args(["generate", "What is 2+2?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credential"));
}

#[test]
fn test_generate_rejects_blank_prompt_with_options() {
    switchboard_cmd()
        .envs(REQUIRED)
        .args(["generate", "  ", "--system", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("prompt must not be empty"));
}

#[test]
fn test_providers_reports_optional_as_disabled() {
    switchboard_cmd()
        .envs(REQUIRED)
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"secondary\s+Anthropic\s+enabled").unwrap())
        .stdout(predicate::str::is_match(r"command\s+Cohere\s+disabled").unwrap());
}

#[test]
fn test_config_init_and_where_with_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    switchboard_cmd()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));
    assert!(path.exists());

    switchboard_cmd()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    switchboard_cmd()
        .args(["config", "where", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_run_rejects_malformed_input_json() {
    switchboard_cmd()
        .args(["run", "stability-ai/sdxl", "--input", "not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}
