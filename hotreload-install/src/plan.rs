//! What gets installed where.

use std::path::{Path, PathBuf};

use hotreload_core::{
    manifest,
    types::{ArtifactKind, PluginId, PluginManifest, Vault},
    vault,
};

use crate::error::InstallError;

/// One file copied from the build output into the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub file_name: String,
    pub required: bool,
}

/// A plugin install target: which build output goes into which vault.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub vault: Vault,
    /// Build output directory holding `manifest.json` / `main.js`.
    pub source_dir: PathBuf,
    pub manifest: PluginManifest,
    /// Extra file names copied alongside the standard artifacts; always optional.
    pub extra_artifacts: Vec<String>,
}

impl InstallPlan {
    /// Build a plan by loading `<source_dir>/manifest.json`.
    pub fn prepare(
        vault: Vault,
        source_dir: PathBuf,
        extra_artifacts: Vec<String>,
    ) -> Result<Self, InstallError> {
        let manifest = manifest::load(&source_dir)?;
        Ok(Self {
            vault,
            source_dir,
            manifest,
            extra_artifacts,
        })
    }

    /// Like [`InstallPlan::prepare`], but reads the manifest from
    /// `fallback_dir` while `source_dir` has none, e.g. before the first build
    /// of a bundler that writes to `dist/`. Installs still re-check the id
    /// against the built manifest.
    pub fn prepare_with_fallback(
        vault: Vault,
        source_dir: PathBuf,
        fallback_dir: &Path,
        extra_artifacts: Vec<String>,
    ) -> Result<Self, InstallError> {
        let built = source_dir.join(ArtifactKind::Manifest.file_name());
        let manifest_dir = if built.is_file() { source_dir.as_path() } else { fallback_dir };
        let manifest = manifest::load(manifest_dir)?;
        Ok(Self {
            vault,
            source_dir,
            manifest,
            extra_artifacts,
        })
    }

    pub fn plugin_id(&self) -> &PluginId {
        &self.manifest.id
    }

    /// `<vault>/.obsidian/plugins/<id>`
    pub fn target_dir(&self) -> PathBuf {
        vault::plugin_dir(&self.vault, &self.manifest.id)
    }

    /// Standard artifacts followed by extras, de-duplicated by file name.
    pub fn artifacts(&self) -> Vec<ArtifactSpec> {
        let mut specs: Vec<ArtifactSpec> = ArtifactKind::all()
            .iter()
            .map(|kind| ArtifactSpec {
                file_name: kind.file_name().to_string(),
                required: kind.is_required(),
            })
            .collect();
        for extra in &self.extra_artifacts {
            if !specs.iter().any(|s| &s.file_name == extra) {
                specs.push(ArtifactSpec {
                    file_name: extra.clone(),
                    required: false,
                });
            }
        }
        specs
    }

    /// True when `path` names one of this plan's artifacts.
    pub fn is_artifact(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.artifacts().iter().any(|spec| spec.file_name == name)
    }

    /// True when every required artifact exists in the build output.
    pub fn artifacts_ready(&self) -> bool {
        self.artifacts()
            .iter()
            .filter(|spec| spec.required)
            .all(|spec| self.source_dir.join(&spec.file_name).is_file())
    }
}
