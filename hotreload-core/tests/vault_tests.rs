//! Vault resolution and community-plugins integration tests.

use assert_fs::prelude::*;
use hotreload_core::{
    community,
    types::{PluginId, Vault},
    vault, CoreError,
};
use predicates::prelude::{predicate, Predicate};
use std::fs;
use std::path::Path;

fn make_vault(root: &assert_fs::TempDir, name: &str) -> std::path::PathBuf {
    let dir = root.child(name);
    dir.child(".obsidian").create_dir_all().expect("mkdir vault");
    dir.path().canonicalize().expect("canonicalize")
}

fn write_app_state(config_root: &Path, vault_paths: &[&Path]) {
    let dir = config_root.join("obsidian");
    fs::create_dir_all(&dir).expect("mkdir obsidian config");
    let entries: serde_json::Map<String, serde_json::Value> = vault_paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            (
                format!("{i:016x}"),
                serde_json::json!({ "path": p, "ts": 1_700_000_000_000u64 + i as u64 }),
            )
        })
        .collect();
    fs::write(
        dir.join("obsidian.json"),
        serde_json::to_string(&serde_json::json!({ "vaults": entries })).unwrap(),
    )
    .expect("write obsidian.json");
}

// ---------------------------------------------------------------------------
// 1. Resolution
// ---------------------------------------------------------------------------

#[test]
fn resolve_by_path_opens_vault() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let config = assert_fs::TempDir::new().expect("config");
    let path = make_vault(&root, "hr-path-vault");

    let resolved = vault::resolve_at(config.path(), path.to_str().unwrap()).expect("resolve");
    assert_eq!(resolved.path, path);
    assert_eq!(resolved.name, "hr-path-vault");
}

#[test]
fn resolve_by_name_uses_app_state() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let config = assert_fs::TempDir::new().expect("config");
    let dev = make_vault(&root, "hr-name-dev-vault");
    let other = make_vault(&root, "hr-name-other-vault");
    write_app_state(config.path(), &[&dev, &other]);

    let resolved = vault::resolve_at(config.path(), "hr-name-dev-vault").expect("resolve");
    assert_eq!(resolved.path, dev);
}

#[test]
fn resolve_unknown_name_is_not_found() {
    let config = assert_fs::TempDir::new().expect("config");
    let err = vault::resolve_at(config.path(), "hr-no-such-vault").unwrap_err();
    assert!(matches!(err, CoreError::VaultNotFound { .. }), "got: {err}");
    assert!(predicate::str::contains("hr-no-such-vault").eval(&err.to_string()));
}

#[test]
fn resolve_duplicate_name_is_ambiguous() {
    let a = assert_fs::TempDir::new().expect("a");
    let b = assert_fs::TempDir::new().expect("b");
    let config = assert_fs::TempDir::new().expect("config");
    let first = make_vault(&a, "hr-twin-vault");
    let second = make_vault(&b, "hr-twin-vault");
    write_app_state(config.path(), &[&first, &second]);

    let err = vault::resolve_at(config.path(), "hr-twin-vault").unwrap_err();
    match err {
        CoreError::AmbiguousVault { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("expected AmbiguousVault, got: {other}"),
    }
}

#[test]
fn known_vaults_skips_deleted_directories() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let config = assert_fs::TempDir::new().expect("config");
    let kept = make_vault(&root, "kept");
    let gone = root.path().join("gone");
    write_app_state(config.path(), &[&kept, &gone]);

    let vaults = vault::known_vaults_at(config.path()).expect("list");
    assert_eq!(vaults.len(), 1);
    assert_eq!(vaults[0].name, "kept");
}

// ---------------------------------------------------------------------------
// 2. community-plugins.json
// ---------------------------------------------------------------------------

#[test]
fn enable_creates_file_and_is_idempotent() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let vault = Vault::from_path(make_vault(&root, "v"));
    let ids = [PluginId::from("sample"), PluginId::from("hotreload-helper")];

    let added = community::enable_at(&vault, &ids).expect("enable");
    assert_eq!(added, ids.to_vec());

    let again = community::enable_at(&vault, &ids).expect("enable again");
    assert!(again.is_empty(), "second enable must add nothing");
    assert_eq!(community::enabled_at(&vault).unwrap(), ids.to_vec());
}

#[test]
fn enable_preserves_existing_order() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let vault = Vault::from_path(make_vault(&root, "v"));
    fs::write(
        community::community_plugins_path(&vault),
        r#"["dataview","sample"]"#,
    )
    .unwrap();

    let added = community::enable_at(&vault, &[PluginId::from("sample"), PluginId::from("new")])
        .expect("enable");
    assert_eq!(added, vec![PluginId::from("new")]);

    let enabled: Vec<String> = community::enabled_at(&vault)
        .unwrap()
        .into_iter()
        .map(|id| id.0)
        .collect();
    assert_eq!(enabled, ["dataview", "sample", "new"]);
    assert!(!vault
        .path
        .join(".obsidian")
        .join("community-plugins.json.tmp")
        .exists());
}
