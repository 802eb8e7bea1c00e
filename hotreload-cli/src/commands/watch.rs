//! `hotreload watch`: build, install and reload in a loop.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hotreload_watch::{init_tracing, start_blocking, WatchOptions};

use crate::settings::{home_dir, ProjectContext, VaultArgs};
use crate::Global;

/// Arguments for `hotreload watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub vault: VaultArgs,

    /// Build output directory (default: detected from the project).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Shell command that runs the bundler in watch mode.
    #[arg(long, conflicts_with = "no_build")]
    pub build: Option<String>,

    /// Do not run a build command; only watch the output directory.
    #[arg(long)]
    pub no_build: bool,

    /// Install on change but never trigger a reload.
    #[arg(long)]
    pub no_reload: bool,

    /// Do not install the reload helper plugin.
    #[arg(long)]
    pub no_helper: bool,

    /// Quiet period after the last write before installing.
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

impl WatchArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        init_tracing(global.log_json);

        let home = home_dir()?;
        let project = ProjectContext::load(&global.project)?;
        let vault = project.vault(&self.vault)?;
        let plan = project.plan(vault, self.out.as_deref())?;

        let build_command = project.build_command(self.build.as_deref(), self.no_build);
        let reload = project.reload(self.no_reload);
        let helper = project.helper(self.no_helper);
        // The helper is what handles the reload URL.
        if reload && !helper {
            eprintln!(
                "{} reload is on but the helper is disabled; reloads only work if it is already installed",
                "warning:".yellow().bold()
            );
        }

        println!(
            "{} {} → {} ({})",
            "watching".green().bold(),
            plan.plugin_id().to_string().bold(),
            plan.vault.name,
            plan.target_dir().display()
        );
        println!("  source: {}", plan.source_dir.display());
        match &build_command {
            Some(cmd) => println!("  build:  {cmd}"),
            None => println!("  build:  {}", "none".bright_black()),
        }

        let opts = WatchOptions {
            home,
            plan,
            project_dir: project.dir.clone(),
            debounce: project.debounce(self.debounce_ms),
            reload,
            helper,
            helper_templates: project.helper_templates(),
            build_command,
            open_command: project.open_command(),
        };
        start_blocking(opts).context("watch loop failed")
    }
}
