//! hotreload core library: plugin manifests, vault layout and project config.
//!
//! - [`types`]: newtypes and domain structs
//! - [`manifest`]: `manifest.json` loading and validation
//! - [`vault`]: vault discovery and plugin directory layout
//! - [`community`]: `community-plugins.json` enable list
//! - [`config`]: optional `hotreload.yaml` project config
//! - [`error`]: [`CoreError`]

pub mod community;
pub mod config;
pub mod error;
pub mod manifest;
pub mod types;
pub mod vault;

pub use config::ProjectConfig;
pub use error::CoreError;
pub use types::{ArtifactKind, PluginId, PluginManifest, Vault};
