//! CLI integration tests for the `frota` binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content. Every test runs inside its own temporary
//! directory so no stray `frota.toml` is picked up.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper: create a Command for the `frota` binary, rooted at `dir`.
fn frota(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("frota");
    cmd.current_dir(dir);
    cmd.env_remove("FROTA_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

const ANA: &str = r#"{
    "name": "Ana",
    "document": { "type": "CPF", "number": "12345678900" },
    "department": "Ops",
    "position": "Analyst",
    "phone": "+5511987654321",
    "salary": "3000",
    "address": {
        "zipCode": "01310-100",
        "street": "Av. Paulista",
        "number": "100",
        "neighborhood": "Bela Vista",
        "city": "São Paulo",
        "state": "SP"
    },
    "email": "ana@example.com",
    "password": "Abcdef1!"
}"#;

const GESTOR: &str = r#"{
    "name": "Gestor",
    "permissions": { "fornecedores": { "view": true } }
}"#;

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate and submit fleet-rental entities"));
}

#[test]
fn version_exits_0() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("frota"));
}

// ──────────────────────────────────────────────
// 2. entities / schema
// ──────────────────────────────────────────────

#[test]
fn entities_lists_routes() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .arg("entities")
        .assert()
        .success()
        .stdout(predicate::str::contains("/fornecedores"))
        .stdout(predicate::str::contains("access_level"))
        .stdout(predicate::str::contains("/niveis-acesso"));
}

#[test]
fn entities_json_has_four_kinds() {
    let dir = TempDir::new().unwrap();
    let out = frota(dir.path())
        .args(["--output", "json", "entities"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let kinds = parsed.as_array().unwrap();
    assert_eq!(kinds.len(), 4);
    assert_eq!(kinds[1]["route"], "/contratos");
}

#[test]
fn schema_prints_fields() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .args(["schema", "user"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"password\""))
        .stdout(predicate::str::contains("\"entity\": \"user\""));
}

#[test]
fn schema_accepts_route_alias_and_exports_json_schema() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .args(["schema", "niveis-acesso", "--json-schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("json-schema.org/draft/2020-12"))
        .stdout(predicate::str::contains("propertyNames"));
}

#[test]
fn schema_unknown_kind_fails() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .args(["schema", "vehicle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown entity kind"));
}

// ──────────────────────────────────────────────
// 3. validate
// ──────────────────────────────────────────────

#[test]
fn validate_valid_user_prints_normalized_record() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "ana.json", ANA);
    let out = frota(dir.path())
        .args(["validate", "user"])
        .arg(&file)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let record: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(record["status"], "active");
    assert_eq!(record["salary"], 3000);
    assert_eq!(record["address"]["country"], "Brasil");
}

#[test]
fn validate_weak_password_exits_1_with_field_errors() {
    let dir = TempDir::new().unwrap();
    let weak = ANA.replace("Abcdef1!", "abcdef");
    let file = write(dir.path(), "weak.json", &weak);
    frota(dir.path())
        .args(["validate", "user"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid user"))
        .stderr(predicate::str::contains("password: must contain an uppercase letter"))
        .stderr(predicate::str::contains("password: must contain a digit"))
        .stderr(predicate::str::contains("password: must contain a special character"));
}

#[test]
fn validate_json_output_lists_errors() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "empty.json", "{}");
    let out = frota(dir.path())
        .args(["--output", "json", "validate", "access_level"])
        .arg(&file)
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed["valid"], false);
    let paths: Vec<&str> = parsed["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["name", "permissions"]);
}

#[test]
fn validate_rejects_non_object_file() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "list.json", "[1, 2]");
    frota(dir.path())
        .args(["validate", "supplier"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must contain a JSON object"));
}

#[test]
fn validate_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .args(["validate", "supplier", "nope.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

// ──────────────────────────────────────────────
// 4. submit
// ──────────────────────────────────────────────

#[test]
fn submit_to_memory_store_creates_and_prints_route() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "gestor.json", GESTOR);
    frota(dir.path())
        .args(["submit", "access_level"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("created access_level 1"))
        .stdout(predicate::str::contains("next: /niveis-acesso"));
}

#[test]
fn submit_quiet_prints_only_id() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "gestor.json", GESTOR);
    frota(dir.path())
        .args(["--quiet", "submit", "access_level"])
        .arg(&file)
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn submit_invalid_record_exits_1() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "bad.json", r#"{ "name": "G" }"#);
    frota(dir.path())
        .args(["submit", "access_level"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("name: must have at least 3 characters"))
        .stderr(predicate::str::contains("permissions: is required"));
}

#[test]
fn submit_to_directory_store_persists_and_updates() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "frota.toml",
        "[store]\nkind = \"directory\"\ndir = \"data\"\n",
    );
    let file = write(dir.path(), "gestor.json", GESTOR);

    frota(dir.path())
        .args(["submit", "access_level"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("created access_level 1"));
    frota(dir.path())
        .args(["submit", "access_level"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("created access_level 2"));

    let stored_path = dir.path().join("data").join("access_level").join("1.json");
    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&stored_path).unwrap()).unwrap();
    assert_eq!(stored["record"]["status"], "active");
    assert_eq!(stored["record"]["permissions"]["fornecedores"]["export"], false);

    let renamed = write(
        dir.path(),
        "renamed.json",
        &GESTOR.replace("\"Gestor\"", "\"Gestor regional\""),
    );
    frota(dir.path())
        .args(["--output", "json", "submit", "access_level", "--id", "1"])
        .arg(&renamed)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"saved\""));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&stored_path).unwrap()).unwrap();
    assert_eq!(stored["record"]["name"], "Gestor regional");
}

#[test]
fn submit_update_of_missing_entity_fails() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "gestor.json", GESTOR);
    frota(dir.path())
        .args(["submit", "access_level", "--id", "5"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("submission failed"))
        .stderr(predicate::str::contains("not found"));
}

// ──────────────────────────────────────────────
// 5. Configuration
// ──────────────────────────────────────────────

#[test]
fn explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();
    frota(dir.path())
        .args(["--config", "missing.toml", "entities"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not read 'missing.toml'"));
}

#[test]
fn directory_store_without_dir_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "custom.toml", "[store]\nkind = \"directory\"\n");
    frota(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("entities")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("needs a dir"));
}
