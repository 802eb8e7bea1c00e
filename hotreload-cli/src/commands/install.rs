//! `hotreload install`: one-shot copy of the build output into the vault.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hotreload_install::{
    pipeline::{self, InstallOptions},
    WriteResult,
};
use hotreload_watch::{open_url, reload_url};

use crate::settings::{home_dir, ProjectContext, VaultArgs};
use crate::Global;

/// Arguments for `hotreload install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub vault: VaultArgs,

    /// Build output directory (default: detected from the project).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Show what would be written without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Trigger a reload after a change was installed.
    #[arg(long, conflicts_with = "dry_run")]
    pub reload: bool,

    /// Do not install the reload helper plugin.
    #[arg(long)]
    pub no_helper: bool,
}

impl InstallArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let home = home_dir()?;
        let project = ProjectContext::load(&global.project)?;
        let vault = project.vault(&self.vault)?;
        let plan = project.plan(vault, self.out.as_deref())?;

        let options = InstallOptions {
            dry_run: self.dry_run,
            helper: project.helper(self.no_helper),
            helper_templates: project.helper_templates(),
        };
        let result = pipeline::run(&home, &plan, &options)
            .with_context(|| format!("install failed for '{}'", plan.plugin_id()))?;

        if let Some(helper) = &result.helper {
            print_writes("hotreload-helper", &helper.writes, self.dry_run);
        }
        print_writes(plan.plugin_id().as_str(), &result.plugin.writes, self.dry_run);
        for id in &result.newly_enabled {
            println!("{} {id}", "enabled".green());
        }

        if result.helper_needs_restart() {
            println!(
                "{} restart the app once so the reload helper is loaded",
                "note:".yellow().bold()
            );
        } else if self.reload && result.plugin.changed() {
            let url = reload_url(&plan.vault.name, plan.plugin_id())?;
            open_url(&url, project.open_command().as_deref())
                .with_context(|| format!("failed to open {url}"))?;
            println!("{} {}", "reloaded".green().bold(), plan.plugin_id());
        }
        Ok(())
    }
}

pub(crate) fn print_writes(name: &str, writes: &[WriteResult], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = writes.iter().filter(|w| w.is_change()).count();
    let unchanged = writes
        .iter()
        .filter(|w| matches!(w, WriteResult::Unchanged { .. }))
        .count();

    if written == 0 {
        println!("{prefix}✓ '{name}' up to date ({unchanged} unchanged)");
        return;
    }

    println!("{prefix}✓ '{name}' installed ({written} written, {unchanged} unchanged)");
    for w in writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
            WriteResult::Skipped { .. } => {}
        }
    }
}
