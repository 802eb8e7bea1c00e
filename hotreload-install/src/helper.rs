//! Reload helper install.

use std::path::{Path, PathBuf};

use hotreload_core::{types::Vault, vault};
use hotreload_helper::{HelperContext, Renderer};

use crate::error::InstallError;
use crate::hash_store;
use crate::writer::{write_rendered, WriteResult};

/// Outcome of writing the helper plugin.
#[derive(Debug, Clone)]
pub struct HelperReport {
    pub target_dir: PathBuf,
    pub writes: Vec<WriteResult>,
}

impl HelperReport {
    pub fn changed(&self) -> bool {
        self.writes.iter().any(WriteResult::is_change)
    }
}

/// Render the helper and gate-write it into `<vault>/.obsidian/plugins/hotreload-helper`.
///
/// Templates found in `templates` replace the embedded ones file by file.
pub fn install_helper(
    home: &Path,
    vault: &Vault,
    templates: Option<&Path>,
    dry_run: bool,
) -> Result<HelperReport, InstallError> {
    let renderer = match templates {
        Some(dir) => Renderer::with_user_templates(dir)?,
        None => Renderer::new()?,
    };
    install_helper_with(home, vault, &renderer, &HelperContext::default(), dry_run)
}

pub fn install_helper_with(
    home: &Path,
    vault: &Vault,
    renderer: &Renderer,
    ctx: &HelperContext,
    dry_run: bool,
) -> Result<HelperReport, InstallError> {
    let target_dir = vault::plugin_dir(vault, &ctx.plugin_id());
    let mut store = hash_store::load_at(home, &ctx.id)?;
    let mut writes = Vec::new();

    for (rel, content) in renderer.render(ctx)? {
        let dest = target_dir.join(rel);
        writes.push(write_rendered(&dest, &content, &mut store.files, dry_run)?);
    }

    if !dry_run {
        store.installed_at = chrono::Utc::now();
        hash_store::save_at(home, &ctx.id, &store)?;
    }

    Ok(HelperReport { target_dir, writes })
}
