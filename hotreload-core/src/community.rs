//! `community-plugins.json`: the host's list of enabled plugins.
//!
//! The file is a bare JSON array of plugin ids. Writes use the same atomic
//! `.tmp` + rename pattern as the rest of hotreload.

use std::path::PathBuf;

use crate::error::{io_err, CoreError};
use crate::types::{PluginId, Vault};
use crate::vault::config_dir;

pub const COMMUNITY_PLUGINS_FILE: &str = "community-plugins.json";

/// `<vault>/.obsidian/community-plugins.json`
pub fn community_plugins_path(vault: &Vault) -> PathBuf {
    config_dir(vault).join(COMMUNITY_PLUGINS_FILE)
}

/// Enabled plugin ids, in file order. A missing file means none.
pub fn enabled_at(vault: &Vault) -> Result<Vec<PluginId>, CoreError> {
    let path = community_plugins_path(vault);
    if !path.exists() {
        return Ok(vec![]);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(vec![]);
    }
    Ok(serde_json::from_str(&contents)?)
}

/// Ensure every id in `ids` is enabled.
///
/// Existing entries keep their order; missing ids are appended. Returns the
/// ids that were newly added (empty when nothing changed, in which case the
/// file is not rewritten).
pub fn enable_at(vault: &Vault, ids: &[PluginId]) -> Result<Vec<PluginId>, CoreError> {
    let mut enabled = enabled_at(vault)?;
    let mut added = Vec::new();
    for id in ids {
        if !enabled.contains(id) {
            enabled.push(id.clone());
            added.push(id.clone());
        }
    }
    if added.is_empty() {
        return Ok(added);
    }

    let path = community_plugins_path(vault);
    let dir = config_dir(vault);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    let json = serde_json::to_string_pretty(&enabled)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(added)
}
