//! Domain types shared by every hotreload crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed plugin identifier, as declared in `manifest.json`.
///
/// The id doubles as the install directory name under
/// `<vault>/.obsidian/plugins/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PluginId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// The subset of a plugin's `manifest.json` that hotreload cares about.
///
/// Unknown fields (`fundingUrl`, `authorUrl`, ...) are ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub id: PluginId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(
        rename = "minAppVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "isDesktopOnly", default)]
    pub is_desktop_only: bool,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// The build outputs a plugin ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Manifest,
    Main,
    Styles,
}

impl ArtifactKind {
    /// All artifact kinds in a stable order; the manifest goes first so the
    /// host never sees a new `main.js` next to a stale manifest.
    pub fn all() -> &'static [ArtifactKind] {
        &[ArtifactKind::Manifest, ArtifactKind::Main, ArtifactKind::Styles]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Manifest => "manifest.json",
            ArtifactKind::Main => "main.js",
            ArtifactKind::Styles => "styles.css",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, ArtifactKind::Styles)
    }

    pub fn from_file_name(name: &str) -> Option<ArtifactKind> {
        ArtifactKind::all()
            .iter()
            .copied()
            .find(|kind| kind.file_name() == name)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// A resolved vault on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vault {
    /// Display name; the last component of `path`. This is the name the host
    /// application uses in `obsidian://` URLs.
    pub name: String,
    /// Canonical absolute path to the vault root.
    pub path: PathBuf,
}

impl Vault {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .unwrap_or_else(|| path.as_os_str())
            .to_string_lossy()
            .into_owned();
        Self { name, path }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
