//! Shared install pipeline entrypoint used by the CLI and the watch runtime.

use std::path::{Path, PathBuf};

use hotreload_core::{community, types::PluginId};
use hotreload_helper::HELPER_ID;

use crate::{install_helper, install_plugin, HelperReport, InstallError, InstallPlan, InstallReport};

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub dry_run: bool,
    /// Also (re)write the reload helper and enable it.
    pub helper: bool,
    /// Override directory for the helper templates.
    pub helper_templates: Option<PathBuf>,
}

/// Everything one pipeline run did.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub plugin: InstallReport,
    pub helper: Option<HelperReport>,
    /// Ids newly added to `community-plugins.json`.
    pub newly_enabled: Vec<PluginId>,
}

impl PipelineResult {
    /// A helper written for the first time is not loaded until the host
    /// restarts, so URL reloads cannot work yet.
    pub fn helper_needs_restart(&self) -> bool {
        self.newly_enabled.iter().any(|id| id.as_str() == HELPER_ID)
    }
}

/// Install the plugin (and optionally the helper), then enable both.
///
/// This is the canonical install entrypoint for both `hotreload install` and
/// the watch runtime's startup pass.
pub fn run(
    home: &Path,
    plan: &InstallPlan,
    options: &InstallOptions,
) -> Result<PipelineResult, InstallError> {
    let helper = if options.helper {
        Some(install_helper(
            home,
            &plan.vault,
            options.helper_templates.as_deref(),
            options.dry_run,
        )?)
    } else {
        None
    };

    let plugin = install_plugin(home, plan, options.dry_run)?;

    let newly_enabled = if options.dry_run {
        Vec::new()
    } else {
        enable_plugins(plan, options.helper)?
    };

    Ok(PipelineResult {
        plugin,
        helper,
        newly_enabled,
    })
}

/// Add the plugin (and helper) to the vault's enabled list.
pub fn enable_plugins(plan: &InstallPlan, with_helper: bool) -> Result<Vec<PluginId>, InstallError> {
    let mut ids = vec![plan.plugin_id().clone()];
    if with_helper {
        ids.push(PluginId::from(HELPER_ID));
    }
    let added = community::enable_at(&plan.vault, &ids)?;
    for id in &added {
        tracing::info!("enabled plugin: {id}");
    }
    Ok(added)
}
