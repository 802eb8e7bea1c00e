//! Install state inspection for `hotreload status`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use hotreload_core::types::PluginId;

use crate::error::{io_err, InstallError};
use crate::hash_store;
use crate::plan::InstallPlan;

/// How an installed artifact compares with the build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// Destination bytes equal source bytes.
    InSync,
    /// Destination exists but differs, or the source is gone.
    Stale,
    NotInstalled,
}

impl InstallState {
    pub fn label(&self) -> &'static str {
        match self {
            InstallState::InSync => "in sync",
            InstallState::Stale => "stale",
            InstallState::NotInstalled => "not installed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStatus {
    pub file_name: String,
    pub required: bool,
    pub source: PathBuf,
    pub source_present: bool,
    pub destination: PathBuf,
    pub state: InstallState,
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub plugin_id: PluginId,
    pub target_dir: PathBuf,
    /// Time of the last recorded install, if any.
    pub installed_at: Option<DateTime<Utc>>,
    pub artifacts: Vec<ArtifactStatus>,
}

impl StatusReport {
    pub fn in_sync(&self) -> bool {
        self.artifacts
            .iter()
            .filter(|a| a.source_present || a.required)
            .all(|a| a.state == InstallState::InSync)
    }
}

/// Compare each artifact of `plan` on disk. Compares real file contents, not
/// the hash store, so edits made behind hotreload's back show up as stale.
pub fn status(home: &Path, plan: &InstallPlan) -> Result<StatusReport, InstallError> {
    let plugin_id = plan.plugin_id().clone();
    let target_dir = plan.target_dir();

    let installed_at = if hash_store::store_path_at(home, plugin_id.as_str()).exists() {
        Some(hash_store::load_at(home, plugin_id.as_str())?.installed_at)
    } else {
        None
    };

    let mut artifacts = Vec::new();
    for spec in plan.artifacts() {
        let source = plan.source_dir.join(&spec.file_name);
        let destination = target_dir.join(&spec.file_name);
        let source_digest = file_digest(&source)?;
        let dest_digest = file_digest(&destination)?;

        let state = match (&source_digest, &dest_digest) {
            (_, None) => InstallState::NotInstalled,
            (Some(src), Some(dst)) if src == dst => InstallState::InSync,
            _ => InstallState::Stale,
        };
        artifacts.push(ArtifactStatus {
            file_name: spec.file_name,
            required: spec.required,
            source_present: source_digest.is_some(),
            source,
            destination,
            state,
        });
    }

    Ok(StatusReport {
        plugin_id,
        target_dir,
        installed_at,
        artifacts,
    })
}

fn file_digest(path: &Path) -> Result<Option<String>, InstallError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(hash_store::digest(&bytes))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}
