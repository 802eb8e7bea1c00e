//! `hotreload vaults`: vaults the app has opened.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use hotreload_core::vault;

/// Arguments for `hotreload vaults`.
#[derive(Args, Debug)]
pub struct VaultsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize, Tabled)]
struct VaultRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl VaultsArgs {
    pub fn run(self) -> Result<()> {
        let rows: Vec<VaultRow> = vault::known_vaults()
            .context("failed to read the app's vault list")?
            .into_iter()
            .map(|v| VaultRow {
                name: v.name,
                path: v.path.display().to_string(),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("No vaults found. Open a vault in the app once, or pass --vault <path>.");
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
