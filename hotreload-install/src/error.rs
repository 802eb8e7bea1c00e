//! Error types for hotreload-install.

use std::path::PathBuf;

use thiserror::Error;

use hotreload_core::{types::PluginId, CoreError};
use hotreload_helper::RenderError;

/// All errors that can arise from install operations.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Manifest, vault or community-plugins failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the helper renderer.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (hash store).
    #[error("hash store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required artifact is absent from the build output.
    #[error("required artifact missing: {path}")]
    MissingArtifact { path: PathBuf },

    /// `manifest.json` was rebuilt with a different id than the session
    /// started with; installing would land in a different directory.
    #[error("plugin id changed from '{expected}' to '{found}'; restart hotreload")]
    PluginIdChanged { expected: PluginId, found: PluginId },
}

/// Convenience constructor for [`InstallError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InstallError {
    InstallError::Io {
        path: path.into(),
        source,
    }
}
