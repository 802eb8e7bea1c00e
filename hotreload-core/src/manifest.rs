//! Plugin `manifest.json` loading.

use std::path::{Path, PathBuf};

use crate::error::{io_err, CoreError};
use crate::types::PluginManifest;

pub const MANIFEST_FILE: &str = "manifest.json";

/// `<dir>/manifest.json`
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

/// Load and validate the manifest in `dir`.
///
/// Returns `CoreError::ManifestNotFound` if absent,
/// `CoreError::ManifestParse` (with path + line context) if malformed JSON,
/// and `CoreError::InvalidManifest` if the id is unusable as a directory name.
pub fn load(dir: &Path) -> Result<PluginManifest, CoreError> {
    let path = manifest_path(dir);
    if !path.exists() {
        return Err(CoreError::ManifestNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let manifest: PluginManifest = serde_json::from_str(&contents)
        .map_err(|e| CoreError::ManifestParse {
            path: path.clone(),
            source: e,
        })?;
    validate_id(&path, manifest.id.as_str())?;
    Ok(manifest)
}

fn validate_id(path: &Path, id: &str) -> Result<(), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidManifest {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    if id.trim().is_empty() {
        return Err(invalid("plugin id is empty"));
    }
    if id.contains('/') || id.contains('\\') || id == "." || id.contains("..") {
        return Err(invalid("plugin id must be a plain directory name"));
    }
    Ok(())
}
