//! Reload trigger: open `obsidian://hotreload-helper?vault=..&id=..` through
//! the OS URL opener so the helper plugin toggles the target plugin.

use std::process::{Command, Stdio};

use url::Url;

use hotreload_core::types::PluginId;
use hotreload_helper::HELPER_ACTION;

use crate::error::{io_err, WatchError};

pub const URL_SCHEME: &str = "obsidian";

/// Build the reload URL for `plugin_id` in the vault named `vault_name`.
///
/// Spaces are encoded as `%20`; the host decodes query values with
/// `decodeURIComponent`, which leaves a form-encoded `+` alone.
pub fn reload_url(vault_name: &str, plugin_id: &PluginId) -> Result<Url, WatchError> {
    let mut url = Url::parse(&format!("{URL_SCHEME}://{HELPER_ACTION}"))?;
    url.query_pairs_mut()
        .append_pair("vault", vault_name)
        .append_pair("id", plugin_id.as_str());
    // Literal '+' was already escaped to %2B, so any remaining '+' is a space.
    if let Some(query) = url.query().map(|q| q.replace('+', "%20")) {
        url.set_query(Some(&query));
    }
    Ok(url)
}

/// Platform default argv for opening a URL; the URL is appended.
pub fn default_open_command() -> Vec<String> {
    platform_open_command(std::env::consts::OS)
}

/// Opener argv for `os` (a `std::env::consts::OS` value).
///
/// Not `cmd /C start` on Windows: cmd would split the unquoted URL at `&`.
fn platform_open_command(os: &str) -> Vec<String> {
    let argv: &[&str] = match os {
        "macos" => &["open", "-g"],
        "windows" => &["rundll32", "url.dll,FileProtocolHandler"],
        _ => &["xdg-open"],
    };
    argv.iter().map(|s| s.to_string()).collect()
}

/// Full argv run for `url`: `open_command` (or the platform default) with the
/// URL as its last argument.
fn open_argv(url: &Url, open_command: Option<&[String]>) -> Vec<String> {
    let mut argv = match open_command {
        Some(argv) if !argv.is_empty() => argv.to_vec(),
        _ => default_open_command(),
    };
    argv.push(url.as_str().to_string());
    argv
}

/// Run `open_command` (or the platform default) with `url` appended and wait
/// for the opener to return.
pub fn open_url(url: &Url, open_command: Option<&[String]>) -> Result<(), WatchError> {
    let argv = open_argv(url, open_command);
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| WatchError::Runtime("empty open command".to_string()))?;

    tracing::debug!(program = %program, url = %url, "opening reload URL");
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .status()
        .map_err(|e| io_err(program, e))?;

    if !status.success() {
        return Err(WatchError::OpenFailed {
            command: argv[..argv.len() - 1].join(" "),
            code: status.code(),
        });
    }
    Ok(())
}
