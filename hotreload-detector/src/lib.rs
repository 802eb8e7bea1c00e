//! Project detection for `hotreload-detector`.
//!
//! `detect_project(path)` inspects a plugin project root and returns where its
//! bundler writes artifacts and which command starts the bundler in watch
//! mode. Lockfiles decide the package manager; `package.json` scripts decide
//! the command.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// JavaScript package manager driving the plugin build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// What was learned about a plugin project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedProject {
    /// Directory the bundler writes `main.js` / `manifest.json` into,
    /// relative to the project root (`.` for the root itself).
    pub output_dir: PathBuf,
    /// Shell command that runs the bundler, if a suitable script exists.
    pub build_command: Option<String>,
    pub package_manager: PackageManager,
}

/// Errors from project detection.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DetectError {
    DetectError::Io { path: path.into(), source }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Output directory candidates, most specific first.
const OUTPUT_CANDIDATES: &[&str] = &["dist", "build", "."];

/// Scripts that start a bundler, in order of preference. `dev` usually runs
/// esbuild in watch mode; `build` is a one-shot fallback.
const BUILD_SCRIPTS: &[&str] = &["dev", "build"];

/// Detect the build layout of the plugin project at `path`.
pub fn detect_project(path: &Path) -> Result<DetectedProject, DetectError> {
    let package_manager = detect_package_manager(path);
    let output_dir = detect_output_dir(path);
    let build_command = detect_build_script(path)?
        .map(|script| format!("{} run {script}", package_manager.program()));

    Ok(DetectedProject { output_dir, build_command, package_manager })
}

/// The first candidate directory holding a manifest or bundle; `.` otherwise.
pub fn detect_output_dir(path: &Path) -> PathBuf {
    for candidate in OUTPUT_CANDIDATES {
        let dir = path.join(candidate);
        if dir.join("manifest.json").is_file() || dir.join("main.js").is_file() {
            return PathBuf::from(candidate);
        }
    }
    PathBuf::from(".")
}

pub fn detect_package_manager(path: &Path) -> PackageManager {
    if path.join("pnpm-lock.yaml").exists() { return PackageManager::Pnpm; }
    if path.join("yarn.lock").exists() { return PackageManager::Yarn; }
    if path.join("bun.lockb").exists() || path.join("bun.lock").exists() {
        return PackageManager::Bun;
    }
    PackageManager::Npm
}

// ---------------------------------------------------------------------------
// package.json
// ---------------------------------------------------------------------------

fn detect_build_script(path: &Path) -> Result<Option<&'static str>, DetectError> {
    let file = path.join("package.json");
    if !file.exists() { return Ok(None); }
    let content = fs::read_to_string(&file).map_err(|e| io_err(&file, e))?;

    let json: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        DetectError::ParseError { path: file.clone(), message: e.to_string() }
    })?;

    let Some(scripts) = json.get("scripts").and_then(|s| s.as_object()) else {
        return Ok(None);
    };
    Ok(BUILD_SCRIPTS
        .iter()
        .copied()
        .find(|name| scripts.get(*name).and_then(|v| v.as_str()).is_some()))
}
