//! hotreload: install and hot-reload a plugin into a vault while you build.
//!
//! # Usage
//!
//! ```text
//! hotreload [--project <dir>] watch [--vault V] [--out DIR] [--build CMD] [--no-build]
//!                                   [--no-reload] [--no-helper] [--debounce-ms N]
//! hotreload [--project <dir>] install [--vault V] [--out DIR] [--dry-run] [--reload] [--no-helper]
//! hotreload [--project <dir>] reload [--vault V] [--id ID]
//! hotreload helper [--vault V] [--dry-run]
//! hotreload [--project <dir>] status [--vault V] [--out DIR] [--json]
//! hotreload vaults [--json]
//! ```
//!
//! `--vault` falls back to `$HOTRELOAD_VAULT`, then to `vault:` in
//! `hotreload.yaml`.

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    helper::HelperArgs, install::InstallArgs, reload::ReloadArgs, status::StatusArgs,
    vaults::VaultsArgs, watch::WatchArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hotreload",
    version,
    about = "Copy plugin builds into a vault and reload them on every rebuild",
    long_about = None,
)]
struct Cli {
    /// Plugin project root (holds package.json / hotreload.yaml).
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Log one JSON object per line instead of human-readable text.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the build, then install and reload on every change.
    Watch(WatchArgs),

    /// Copy the current build output into the vault once.
    Install(InstallArgs),

    /// Ask the running app to reload a plugin.
    Reload(ReloadArgs),

    /// Install and enable the reload helper plugin only.
    Helper(HelperArgs),

    /// Show how the installed plugin compares with the build output.
    Status(StatusArgs),

    /// List vaults known to the app.
    Vaults(VaultsArgs),
}

/// Flags shared by every command, resolved once in `main`.
#[derive(Debug, Clone)]
pub struct Global {
    pub project: PathBuf,
    pub log_json: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = Global {
        project: cli.project,
        log_json: cli.log_json,
    };
    match cli.command {
        Commands::Watch(args) => args.run(&global),
        Commands::Install(args) => args.run(&global),
        Commands::Reload(args) => args.run(&global),
        Commands::Helper(args) => args.run(&global),
        Commands::Status(args) => args.run(&global),
        Commands::Vaults(args) => args.run(),
    }
}
