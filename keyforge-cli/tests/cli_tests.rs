//! CLI End-to-End Tests
//!
//! Runs the built `keyforge` binary against a scratch store directory.

use serde_json::Value;
use std::path::Path;
use std::process::Command;

struct Outcome {
    status: i32,
    body: Value,
}

fn keyforge(store: &Path, args: &[&str]) -> Outcome {
    let output = Command::new(env!("CARGO_BIN_EXE_keyforge"))
        .arg("--store-path")
        .arg(store)
        .args(args)
        .env_remove("KEYFORGE_STORE_BACKEND")
        .env_remove("KEYFORGE_STORE_PATH")
        .env_remove("KEYFORGE_ENCTYPES")
        .env_remove("KEYFORGE_LOG_FORMAT")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run keyforge");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "expected one response line, got {:?}", lines);

    Outcome {
        status: output.status.code().unwrap(),
        body: serde_json::from_str(lines[0]).unwrap(),
    }
}

fn assert_request_id(body: &Value) {
    let id = body["request_id"].as_str().unwrap();
    assert_eq!(id.len(), 36, "not a uuid: {}", id);
}

#[test]
fn test_walkthrough() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path();

    let created = keyforge(store, &["create", "host/a.example.org"]);
    assert_eq!(created.status, 0);
    assert_eq!(created.body["success"], true);
    assert_request_id(&created.body);
    let keytab = &created.body["result"]["keytab"];
    assert_eq!(keytab["principal"], "host/a.example.org");
    assert_eq!(keytab["kvno"], 1);
    let enctypes: Vec<&str> = keytab["keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["enctype"].as_str().unwrap())
        .collect();
    assert_eq!(enctypes, vec!["aes256-cts-hmac-sha1-96", "aes128-cts-hmac-sha1-96"]);

    let extracted = keyforge(store, &["extract", "host/a.example.org"]);
    assert_eq!(extracted.status, 0);
    assert_eq!(extracted.body["result"]["keytab"], *keytab);

    let rotated = keyforge(store, &["extract", "host/a.example.org", "--rotate"]);
    assert_eq!(rotated.status, 0);
    assert_eq!(rotated.body["result"]["keytab"]["kvno"], 2);
    assert_ne!(rotated.body["result"]["keytab"]["keys"], keytab["keys"]);

    let exists = keyforge(store, &["exists", "host/b.example.org"]);
    assert_eq!(exists.status, 0);
    assert_eq!(exists.body["result"], serde_json::json!({ "exists": false }));

    let missing = keyforge(store, &["extract", "host/b.example.org"]);
    assert_eq!(missing.status, 1);
    assert_eq!(missing.body["success"], false);
    assert!(missing.body.get("result").is_none());
    assert_eq!(missing.body["error_kind"], "principal_not_found");
    assert_eq!(missing.body["error"], "Principal not found: host/b.example.org");
    assert_request_id(&missing.body);
}

#[test]
fn test_duplicate_create_fails() {
    let dir = tempfile::tempdir().unwrap();

    assert_eq!(keyforge(dir.path(), &["create", "host/a"]).status, 0);
    let again = keyforge(dir.path(), &["create", "host/a"]);
    assert_eq!(again.status, 1);
    assert_eq!(again.body["error_kind"], "principal_already_exists");
}

#[test]
fn test_request_ids_are_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let first = keyforge(dir.path(), &["exists", "host/a"]);
    let second = keyforge(dir.path(), &["exists", "host/a"]);
    assert_ne!(first.body["request_id"], second.body["request_id"]);
}

#[test]
fn test_list() {
    let dir = tempfile::tempdir().unwrap();
    keyforge(dir.path(), &["create", "host/b"]);
    keyforge(dir.path(), &["create", "host/a"]);

    let listed = keyforge(dir.path(), &["list"]);
    assert_eq!(
        listed.body["result"]["principals"],
        serde_json::json!(["host/a", "host/b"])
    );
}

#[test]
fn test_empty_principal_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = keyforge(dir.path(), &["create", ""]);
    assert_eq!(outcome.status, 1);
    assert_eq!(outcome.body["error_kind"], "invalid_principal");
}

#[test]
fn test_unknown_enctype_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = keyforge(dir.path(), &["--enctypes", "des-cbc-md5", "create", "host/a"]);
    assert_eq!(outcome.status, 1);
    assert_eq!(outcome.body["error_kind"], "unsupported_enctype");

    let exists = keyforge(dir.path(), &["exists", "host/a"]);
    assert_eq!(exists.body["result"]["exists"], false);
}

#[test]
fn test_memory_backend_forgets_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let created = keyforge(dir.path(), &["--backend", "memory", "create", "host/a"]);
    assert_eq!(created.status, 0);

    let exists = keyforge(dir.path(), &["--backend", "memory", "exists", "host/a"]);
    assert_eq!(exists.body["result"]["exists"], false);
}

#[test]
fn test_corrupt_record_reported() {
    let dir = tempfile::tempdir().unwrap();
    keyforge(dir.path(), &["create", "host/a"]);

    // One directory per principal, one document per key version
    let principal_dir = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.is_dir())
        .unwrap();
    std::fs::write(principal_dir.join("1.principal"), "{").unwrap();

    let outcome = keyforge(dir.path(), &["extract", "host/a"]);
    assert_eq!(outcome.status, 1);
    assert_eq!(outcome.body["error_kind"], "corrupt_record");
}

#[test]
fn test_bad_arguments_still_respond() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = keyforge(dir.path(), &["rotate-everything"]);
    assert_eq!(outcome.status, 1);
    assert_eq!(outcome.body["success"], false);
    assert_eq!(outcome.body["error_kind"], "invalid_arguments");
    assert_request_id(&outcome.body);
}

#[test]
fn test_long_principal_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let long = format!("host/{}.example.org", "b".repeat(300));

    assert_eq!(keyforge(dir.path(), &["create", &long]).status, 0);
    let rotated = keyforge(dir.path(), &["extract", &long, "--rotate"]);
    assert_eq!(rotated.status, 0);
    assert_eq!(rotated.body["result"]["keytab"]["kvno"], 2);

    let listed = keyforge(dir.path(), &["list"]);
    assert_eq!(listed.body["result"]["principals"], serde_json::json!([long]));
}
