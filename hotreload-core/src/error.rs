//! Error types for hotreload-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from manifest, vault and config operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (write path).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plugin manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// Malformed `manifest.json`; carries serde_json's line/column context.
    #[error("failed to parse plugin manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid plugin manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("{path} is not a vault (no .obsidian directory)")]
    NotAVault { path: PathBuf },

    #[error("no vault named or located at '{spec}'")]
    VaultNotFound { spec: String },

    #[error("vault name '{name}' is ambiguous; candidates: {}", display_paths(.candidates))]
    AmbiguousVault {
        name: String,
        candidates: Vec<PathBuf>,
    },

    /// `dirs::config_dir()` returned `None`.
    #[error("cannot determine the platform config directory")]
    ConfigDirNotFound,

    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
