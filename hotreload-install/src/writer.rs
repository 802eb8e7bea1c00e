//! Atomic writer and plugin install.
//!
//! ## `gated_write` protocol
//!
//! 1. SHA-256 hash the incoming bytes.
//! 2. Compare with the stored hash → skip if identical *and* the destination
//!    still exists (a deleted plugin dir must be repopulated).
//! 3. Ensure the parent directory exists.
//! 4. Write to `<path>.hotreload.tmp`.
//! 5. Rename to final path (atomic on POSIX).
//! 6. Update the hash store entry (caller saves the store).

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;

use hotreload_core::{manifest, types::PluginId};

use crate::error::{io_err, InstallError};
use crate::hash_store::{self, HashStore};
use crate::plan::InstallPlan;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// Content matches the stored hash; nothing written.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
    /// Optional artifact absent from the build output.
    Skipped { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path }
            | WriteResult::Skipped { path } => path,
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, WriteResult::Written { .. } | WriteResult::WouldWrite { .. })
    }
}

// ---------------------------------------------------------------------------
// gated_write
// ---------------------------------------------------------------------------

fn tmp_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.hotreload.tmp", path.display()))
}

/// Copy `src` to `dest` through the hash gate.
pub fn copy_artifact(
    src: &Path,
    dest: &Path,
    store: &mut HashStore,
    dry_run: bool,
) -> Result<WriteResult, InstallError> {
    let bytes = std::fs::read(src).map_err(|e| io_err(src, e))?;
    gated_write(dest, &bytes, store, dry_run, &tmp_path_for(dest))
}

/// Write generated text to `dest` through the hash gate.
pub fn write_rendered(
    dest: &Path,
    content: &str,
    store: &mut HashStore,
    dry_run: bool,
) -> Result<WriteResult, InstallError> {
    gated_write(dest, content.as_bytes(), store, dry_run, &tmp_path_for(dest))
}

fn gated_write(
    path: &Path,
    bytes: &[u8],
    store: &mut HashStore,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, InstallError> {
    let digest = hash_store::digest(bytes);

    let key = path.to_string_lossy().to_string();
    if store.get(&key) == Some(&digest) && path.exists() {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, bytes).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    store.insert(key, digest);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// install_plugin
// ---------------------------------------------------------------------------

/// Outcome of installing one plugin.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub plugin_id: PluginId,
    pub target_dir: PathBuf,
    pub writes: Vec<WriteResult>,
    pub duration: Duration,
}

impl InstallReport {
    /// True when anything was (or, in dry-run, would be) written.
    pub fn changed(&self) -> bool {
        self.writes.iter().any(WriteResult::is_change)
    }

    pub fn written_count(&self) -> usize {
        self.writes.iter().filter(|w| w.is_change()).count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, WriteResult::Unchanged { .. }))
            .count()
    }
}

/// Copy every artifact of `plan` into the vault.
///
/// Required artifacts are checked up front so a half-finished build never
/// produces a half-installed plugin. The manifest is re-read to catch a
/// truncated or re-identified `manifest.json` before anything is copied.
pub fn install_plugin(
    home: &Path,
    plan: &InstallPlan,
    dry_run: bool,
) -> Result<InstallReport, InstallError> {
    let started = Instant::now();
    let install_started_at = Utc::now();

    let current = manifest::load(&plan.source_dir)?;
    if current.id != plan.manifest.id {
        return Err(InstallError::PluginIdChanged {
            expected: plan.manifest.id.clone(),
            found: current.id,
        });
    }

    let artifacts = plan.artifacts();
    for spec in artifacts.iter().filter(|s| s.required) {
        let src = plan.source_dir.join(&spec.file_name);
        if !src.is_file() {
            return Err(InstallError::MissingArtifact { path: src });
        }
    }

    let plugin_id = plan.plugin_id().as_str();
    let target_dir = plan.target_dir();
    let mut store = hash_store::load_at(home, plugin_id)?;
    let mut writes = Vec::with_capacity(artifacts.len());

    for spec in &artifacts {
        let src = plan.source_dir.join(&spec.file_name);
        let dest = target_dir.join(&spec.file_name);
        if !src.is_file() {
            tracing::debug!("skipping absent optional artifact: {}", src.display());
            writes.push(WriteResult::Skipped { path: dest });
            continue;
        }
        writes.push(copy_artifact(&src, &dest, &mut store.files, dry_run)?);
    }

    if !dry_run {
        store.installed_at = install_started_at;
        hash_store::save_at(home, plugin_id, &store)?;
    }

    Ok(InstallReport {
        plugin_id: plan.plugin_id().clone(),
        target_dir,
        writes,
        duration: started.elapsed(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn write_bytes(path: &Path, content: &str) -> WriteResult {
        let mut store = HashMap::new();
        write_rendered(path, content, &mut store, false).unwrap()
    }

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.js");
        let result = write_bytes(&path, "console.log(1)");
        assert!(matches!(result, WriteResult::Written { .. }));
        assert!(path.exists());
    }

    #[test]
    fn second_write_same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.js");
        let mut store = HashMap::new();
        write_rendered(&path, "same", &mut store, false).unwrap();
        let result = write_rendered(&path, "same", &mut store, false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn deleted_destination_is_rewritten_despite_hash_match() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.js");
        let mut store = HashMap::new();
        write_rendered(&path, "same", &mut store, false).unwrap();
        fs::remove_file(&path).unwrap();

        let result = write_rendered(&path, "same", &mut store, false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "same");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.js");
        let mut store = HashMap::new();
        let result = write_rendered(&path, "content", &mut store, true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
        assert!(store.is_empty(), "dry-run must not record hashes");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.js");
        write_bytes(&path, "data");
        assert!(!tmp_path_for(&path).exists(), ".hotreload.tmp must be cleaned up");
    }

    #[test]
    fn copy_preserves_binary_content() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.bin");
        let dest = tmp.path().join("plugins").join("sample").join("main.js");
        let payload = [0u8, 159, 146, 150, b'\r', b'\n'];
        fs::write(&src, payload).unwrap();

        let mut store = HashMap::new();
        copy_artifact(&src, &dest, &mut store, false).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), payload);
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("main.js");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("main.js.hotreload.tmp");

        let mut store = HashMap::new();
        let result = gated_write(&path, b"new content", &mut store, false, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root bypasses directory permissions; only assert when
        // the rename actually failed.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".hotreload.tmp should be cleaned up");
            assert!(store.is_empty());
        }
    }
}
