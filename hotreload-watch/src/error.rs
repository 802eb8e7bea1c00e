use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watch runtime, build supervisor and reload trigger.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("install error: {0}")]
    Install(#[from] hotreload_install::InstallError),

    #[error("invalid reload URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("open command `{command}` failed with {}", display_code(*.code))]
    OpenFailed { command: String, code: Option<i32> },

    #[error("build command exited with {}", display_code(*.code))]
    BuildExited { code: Option<i32> },
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WatchError {
    WatchError::Io {
        path: path.into(),
        source,
    }
}
