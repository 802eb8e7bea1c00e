//! SHA-256 hash store for installed files.
//!
//! Persists a `HashStoreFile` JSON document at
//! `<home>/.hotreload/hashes/<plugin_id>.json`, keyed by destination path so
//! the same plugin installed into several vaults keeps separate entries.
//! Writes use the atomic `.tmp` + rename pattern.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{io_err, InstallError};

/// In-memory hash store: maps destination path strings to their last
/// installed SHA-256 hex digest.
pub type HashStore = HashMap<String, String>;

/// On-disk hash store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashStoreFile {
    pub installed_at: DateTime<Utc>,
    #[serde(default)]
    pub files: HashStore,
}

impl HashStoreFile {
    fn empty() -> Self {
        Self {
            installed_at: Utc::now(),
            files: HashStore::new(),
        }
    }
}

/// `<home>/.hotreload`
pub fn state_root(home: &Path) -> PathBuf {
    home.join(".hotreload")
}

/// `<home>/.hotreload/hashes/<plugin_id>.json`
pub fn store_path_at(home: &Path, plugin_id: &str) -> PathBuf {
    state_root(home)
        .join("hashes")
        .join(format!("{plugin_id}.json"))
}

/// SHA-256 hex digest of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Load the store for `plugin_id`; a plugin never installed gets an empty one.
pub fn load_at(home: &Path, plugin_id: &str) -> Result<HashStoreFile, InstallError> {
    let path = store_path_at(home, plugin_id);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashStoreFile::empty()),
        Err(err) => Err(io_err(&path, err)),
    }
}

/// Persist the store for `plugin_id` through `<path>.json.tmp` + rename.
pub fn save_at(home: &Path, plugin_id: &str, store: &HashStoreFile) -> Result<(), InstallError> {
    let path = store_path_at(home, plugin_id);
    let dir = state_root(home).join("hashes");
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(store)?).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))
}
