//! `hotreload status`: per-artifact install state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use hotreload_core::community;
use hotreload_install::{status, InstallState, StatusReport};

use crate::settings::{home_dir, ProjectContext, VaultArgs};
use crate::Global;

/// Arguments for `hotreload status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub vault: VaultArgs,

    /// Build output directory (default: detected from the project).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let home = home_dir()?;
        let project = ProjectContext::load(&global.project)?;
        let vault = project.vault(&self.vault)?;
        let plan = project.plan(vault, self.out.as_deref())?;

        let report = status(&home, &plan).context("failed to inspect the installed plugin")?;
        let enabled = community::enabled_at(&plan.vault)
            .context("failed to read community-plugins.json")?
            .contains(plan.plugin_id());

        if self.json {
            let json = StatusJson::new(&plan.vault.name, enabled, &report);
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        print_table(&plan.vault.name, enabled, &report);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson {
    plugin: String,
    vault: String,
    target_dir: String,
    enabled: bool,
    in_sync: bool,
    installed_at: Option<String>,
    artifacts: Vec<ArtifactJson>,
}

#[derive(Serialize)]
struct ArtifactJson {
    file: String,
    required: bool,
    source_present: bool,
    state: &'static str,
}

impl StatusJson {
    fn new(vault: &str, enabled: bool, report: &StatusReport) -> Self {
        Self {
            plugin: report.plugin_id.to_string(),
            vault: vault.to_string(),
            target_dir: report.target_dir.display().to_string(),
            enabled,
            in_sync: report.in_sync(),
            installed_at: report.installed_at.map(|at| at.to_rfc3339()),
            artifacts: report
                .artifacts
                .iter()
                .map(|a| ArtifactJson {
                    file: a.file_name.clone(),
                    required: a.required,
                    source_present: a.source_present,
                    state: state_key(a.state),
                })
                .collect(),
        }
    }
}

#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "Artifact")]
    file: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Installed")]
    state: String,
}

fn print_table(vault: &str, enabled: bool, report: &StatusReport) {
    let indicator = if report.in_sync() {
        "■".green().bold()
    } else {
        "■".yellow().bold()
    };
    println!("{indicator} {} in '{vault}'", report.plugin_id.to_string().bold());
    println!("  target:    {}", report.target_dir.display());
    println!(
        "  enabled:   {}",
        if enabled { "yes".green() } else { "no".yellow() }
    );
    println!("  installed: {}", installed_age(report));

    let rows: Vec<ArtifactRow> = report
        .artifacts
        .iter()
        .map(|a| ArtifactRow {
            file: if a.required {
                a.file_name.clone()
            } else {
                format!("{} (optional)", a.file_name)
            },
            source: if a.source_present { "present" } else { "missing" }.to_string(),
            state: a.state.label().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !report.in_sync() {
        println!("Run 'hotreload install' to update the vault copy.");
    }
}

fn installed_age(report: &StatusReport) -> String {
    let Some(at) = report.installed_at else {
        return "never".to_string();
    };
    let secs = (chrono::Utc::now() - at).num_seconds().max(0);
    let age = match secs {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    };
    format!("{age} ({})", at.format("%Y-%m-%d %H:%M:%S UTC"))
}

fn state_key(state: InstallState) -> &'static str {
    match state {
        InstallState::InSync => "in_sync",
        InstallState::Stale => "stale",
        InstallState::NotInstalled => "not_installed",
    }
}
