//! Vault discovery and on-disk layout.
//!
//! # Layout
//!
//! ```text
//! <vault>/
//!   .obsidian/
//!     community-plugins.json   (enabled plugin ids)
//!     plugins/
//!       <plugin_id>/           (manifest.json, main.js, styles.css)
//! ```
//!
//! The host application records every vault it has opened in
//! `<config_dir>/obsidian/obsidian.json`; [`resolve_at`] uses it to turn a
//! bare vault name into a path.
//!
//! # API pattern
//!
//! Functions that touch the platform config dir come in two forms:
//! - `fn_at(config_root: &Path, …)`: explicit root; used in tests with `TempDir`
//! - `fn(…)`: derives the root from `dirs::config_dir()`, delegates to `_at`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, CoreError};
use crate::types::{PluginId, Vault};

pub const CONFIG_DIR_NAME: &str = ".obsidian";
pub const APP_DIR_NAME: &str = "obsidian";
pub const APP_STATE_FILE: &str = "obsidian.json";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<vault>/.obsidian`
pub fn config_dir(vault: &Vault) -> PathBuf {
    vault.path.join(CONFIG_DIR_NAME)
}

/// `<vault>/.obsidian/plugins`
pub fn plugins_dir(vault: &Vault) -> PathBuf {
    config_dir(vault).join("plugins")
}

/// `<vault>/.obsidian/plugins/<id>`
pub fn plugin_dir(vault: &Vault, id: &PluginId) -> PathBuf {
    plugins_dir(vault).join(id.as_str())
}

/// `<config_root>/obsidian/obsidian.json`
pub fn app_state_path_at(config_root: &Path) -> PathBuf {
    config_root.join(APP_DIR_NAME).join(APP_STATE_FILE)
}

// ---------------------------------------------------------------------------
// 2. Open / resolve
// ---------------------------------------------------------------------------

/// Open the vault rooted at `path`.
///
/// Fails with `CoreError::NotAVault` unless `<path>/.obsidian` is a directory.
pub fn open(path: &Path) -> Result<Vault, CoreError> {
    let canonical = std::fs::canonicalize(path).map_err(|e| io_err(path, e))?;
    if !canonical.join(CONFIG_DIR_NAME).is_dir() {
        return Err(CoreError::NotAVault { path: canonical });
    }
    Ok(Vault::from_path(canonical))
}

/// Resolve `spec` (a vault path or a vault name) into a [`Vault`].
///
/// An existing directory always wins over a name lookup.
pub fn resolve_at(config_root: &Path, spec: &str) -> Result<Vault, CoreError> {
    let as_path = Path::new(spec);
    if as_path.is_dir() {
        return open(as_path);
    }

    let candidates: Vec<PathBuf> = registered_paths_at(config_root)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy() == spec)
                .unwrap_or(false)
        })
        .collect();

    match candidates.as_slice() {
        [] => Err(CoreError::VaultNotFound {
            spec: spec.to_string(),
        }),
        [only] => open(only),
        _ => Err(CoreError::AmbiguousVault {
            name: spec.to_string(),
            candidates,
        }),
    }
}

/// `resolve_at` convenience wrapper.
pub fn resolve(spec: &str) -> Result<Vault, CoreError> {
    resolve_at(&config_root()?, spec)
}

/// Every registered vault whose directory still exists, sorted by name.
pub fn known_vaults_at(config_root: &Path) -> Result<Vec<Vault>, CoreError> {
    let mut vaults: Vec<Vault> = registered_paths_at(config_root)?
        .into_iter()
        .filter(|path| path.is_dir())
        .map(Vault::from_path)
        .collect();
    vaults.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    Ok(vaults)
}

/// `known_vaults_at` convenience wrapper.
pub fn known_vaults() -> Result<Vec<Vault>, CoreError> {
    known_vaults_at(&config_root()?)
}

// ---------------------------------------------------------------------------
// 3. obsidian.json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AppState {
    #[serde(default)]
    vaults: HashMap<String, VaultEntry>,
}

#[derive(Debug, Deserialize)]
struct VaultEntry {
    path: PathBuf,
}

fn registered_paths_at(config_root: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let path = app_state_path_at(config_root);
    if !path.exists() {
        return Ok(vec![]);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let state: AppState = serde_json::from_str(&contents)?;
    let mut paths: Vec<PathBuf> = state.vaults.into_values().map(|v| v.path).collect();
    paths.sort();
    paths.dedup();
    Ok(paths)
}

fn config_root() -> Result<PathBuf, CoreError> {
    dirs::config_dir().ok_or(CoreError::ConfigDirNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plugin_dir_layout() {
        let vault = Vault::from_path(PathBuf::from("/v"));
        assert_eq!(
            plugin_dir(&vault, &PluginId::from("sample")),
            PathBuf::from("/v/.obsidian/plugins/sample")
        );
    }

    #[test]
    fn open_rejects_plain_directory() {
        let tmp = TempDir::new().unwrap();
        let err = open(tmp.path()).unwrap_err();
        assert!(matches!(err, CoreError::NotAVault { .. }), "got: {err}");
    }

    #[test]
    fn known_vaults_empty_without_state_file() {
        let tmp = TempDir::new().unwrap();
        assert!(known_vaults_at(tmp.path()).unwrap().is_empty());
    }
}
