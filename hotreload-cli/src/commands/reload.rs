//! `hotreload reload`: open the reload URL for a plugin.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hotreload_core::{manifest, types::PluginId};
use hotreload_watch::{open_url, reload_url};

use crate::settings::{ProjectContext, VaultArgs};
use crate::Global;

/// Arguments for `hotreload reload`.
#[derive(Args, Debug)]
pub struct ReloadArgs {
    #[command(flatten)]
    pub vault: VaultArgs,

    /// Plugin id (default: the id in the project's manifest.json).
    #[arg(long)]
    pub id: Option<String>,
}

impl ReloadArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let project = ProjectContext::load(&global.project)?;
        let vault = project.vault(&self.vault)?;

        let id = match self.id {
            Some(id) => PluginId::from(id),
            None => {
                let dir = project.output_dir(None);
                manifest::load(&dir)
                    .with_context(|| format!("pass --id or build into {}", dir.display()))?
                    .id
            }
        };

        let url = reload_url(&vault.name, &id)?;
        open_url(&url, project.open_command().as_deref())
            .with_context(|| format!("failed to open {url}"))?;
        println!("{} {id} in '{}'", "reloaded".green().bold(), vault.name);
        Ok(())
    }
}
