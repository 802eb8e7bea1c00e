//! Settings resolution shared by the commands.
//!
//! Precedence for every knob: CLI flag (or its env var), then
//! `hotreload.yaml`, then project detection, then the built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use hotreload_core::{config, types::Vault, vault, ProjectConfig};
use hotreload_detector::{detect_project, DetectedProject};
use hotreload_install::InstallPlan;
use hotreload_watch::defaults::DEBOUNCE_WINDOW;

pub const VAULT_ENV: &str = "HOTRELOAD_VAULT";

/// `--vault`, shared by every command that targets a vault.
#[derive(Args, Debug, Clone)]
pub struct VaultArgs {
    /// Vault path or vault name.
    #[arg(long, env = VAULT_ENV)]
    pub vault: Option<String>,
}

/// A plugin project with its config file and detected layout loaded.
#[derive(Debug)]
pub struct ProjectContext {
    pub dir: PathBuf,
    pub config: ProjectConfig,
    pub detected: DetectedProject,
}

impl ProjectContext {
    pub fn load(dir: &Path) -> Result<Self> {
        let dir = std::fs::canonicalize(dir)
            .with_context(|| format!("project directory {} not found", dir.display()))?;
        let config = config::load(&dir)
            .with_context(|| format!("failed to load {}", config::config_path(&dir).display()))?;
        let detected = detect_project(&dir)
            .with_context(|| format!("failed to inspect project at {}", dir.display()))?;
        Ok(Self {
            dir,
            config,
            detected,
        })
    }

    /// Flag / env first, then `vault:` from the config file.
    pub fn vault(&self, args: &VaultArgs) -> Result<Vault> {
        let Some(spec) = args.vault.as_deref().or(self.config.vault.as_deref()) else {
            bail!(
                "no vault selected: pass --vault, set {VAULT_ENV}, or add `vault:` to {}",
                config::CONFIG_FILE
            );
        };
        let spec = expand_home(spec);
        vault::resolve(&spec).with_context(|| format!("could not resolve vault '{spec}'"))
    }

    /// Build output directory, absolute.
    pub fn output_dir(&self, flag: Option<&Path>) -> PathBuf {
        let relative = flag
            .map(Path::to_path_buf)
            .or_else(|| self.config.output_dir.clone())
            .unwrap_or_else(|| self.detected.output_dir.clone());
        if relative.is_absolute() {
            relative
        } else if relative == Path::new(".") {
            self.dir.clone()
        } else {
            self.dir.join(relative)
        }
    }

    pub fn build_command(&self, flag: Option<&str>, no_build: bool) -> Option<String> {
        if no_build {
            return None;
        }
        flag.map(str::to_string)
            .or_else(|| self.config.build_command.clone())
            .or_else(|| self.detected.build_command.clone())
    }

    pub fn debounce(&self, flag: Option<u64>) -> Duration {
        flag.or(self.config.debounce_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEBOUNCE_WINDOW)
    }

    /// `--no-reload` always wins; otherwise the config decides, default on.
    pub fn reload(&self, no_reload: bool) -> bool {
        !no_reload && self.config.reload.unwrap_or(true)
    }

    pub fn helper(&self, no_helper: bool) -> bool {
        !no_helper && self.config.helper.unwrap_or(true)
    }

    /// Helper template override directory, absolute.
    pub fn helper_templates(&self) -> Option<PathBuf> {
        self.config
            .helper_templates
            .as_ref()
            .map(|dir| self.dir.join(dir))
    }

    pub fn open_command(&self) -> Option<Vec<String>> {
        self.config.open_command.clone()
    }

    pub fn plan(&self, vault: Vault, out: Option<&Path>) -> Result<InstallPlan> {
        let source_dir = self.output_dir(out);
        InstallPlan::prepare_with_fallback(
            vault,
            source_dir.clone(),
            &self.dir,
            self.config.extra_artifacts.clone(),
        )
        .with_context(|| {
            format!(
                "no usable manifest.json in {} or {}; build once or pass --out",
                source_dir.display(),
                self.dir.display()
            )
        })
    }
}

/// `$HOME` for the hash store.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

fn expand_home(spec: &str) -> String {
    match (spec.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => spec.to_string(),
    }
}
