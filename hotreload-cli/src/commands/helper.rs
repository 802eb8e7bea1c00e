//! `hotreload helper`: install and enable the reload helper only.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hotreload_core::{community, types::PluginId};
use hotreload_helper::HELPER_ID;
use hotreload_install::install_helper;

use crate::commands::install::print_writes;
use crate::settings::{home_dir, ProjectContext, VaultArgs};
use crate::Global;

/// Arguments for `hotreload helper`.
#[derive(Args, Debug)]
pub struct HelperArgs {
    #[command(flatten)]
    pub vault: VaultArgs,

    /// Show what would be written without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl HelperArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let home = home_dir()?;
        let project = ProjectContext::load(&global.project)?;
        let vault = project.vault(&self.vault)?;

        let templates = project.helper_templates();
        let report = install_helper(&home, &vault, templates.as_deref(), self.dry_run)
            .with_context(|| format!("failed to install the helper into '{}'", vault.name))?;
        print_writes(HELPER_ID, &report.writes, self.dry_run);
        if self.dry_run {
            return Ok(());
        }

        let added = community::enable_at(&vault, &[PluginId::from(HELPER_ID)])
            .context("failed to enable the helper")?;
        if !added.is_empty() {
            println!("{} {HELPER_ID}", "enabled".green());
            println!(
                "{} restart the app once so the reload helper is loaded",
                "note:".yellow().bold()
            );
        }
        Ok(())
    }
}
