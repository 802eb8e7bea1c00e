//! Optional per-project `hotreload.yaml`.
//!
//! ```yaml
//! vault: ~/notes/Dev Vault
//! output_dir: dist
//! build_command: npm run dev
//! debounce_ms: 300
//! reload: true
//! helper: true
//! helper_templates: helper-templates
//! open_command: [xdg-open]
//! extra_artifacts: [data.json]
//! ```
//!
//! Every field is optional; CLI flags take precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

pub const CONFIG_FILE: &str = "hotreload.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Vault path or vault name.
    pub vault: Option<String>,
    /// Build output directory, relative to the project root.
    pub output_dir: Option<PathBuf>,
    pub build_command: Option<String>,
    pub debounce_ms: Option<u64>,
    pub reload: Option<bool>,
    pub helper: Option<bool>,
    /// Directory of `main.js.tera` / `manifest.json.tera` overrides for the
    /// reload helper, relative to the project root.
    pub helper_templates: Option<PathBuf>,
    /// argv used to open `obsidian://` URLs; the URL is appended.
    pub open_command: Option<Vec<String>>,
    /// Additional file names copied alongside the standard artifacts.
    pub extra_artifacts: Vec<String>,
}

/// `<project_dir>/hotreload.yaml`
pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE)
}

/// Load `hotreload.yaml` from `project_dir`, or the default config if absent.
pub fn load(project_dir: &Path) -> Result<ProjectConfig, CoreError> {
    let path = config_path(project_dir);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| CoreError::ConfigParse { path, source: e })
}
