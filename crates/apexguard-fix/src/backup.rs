//! Pre-fix backups and rollback.
//!
//! Backups are keyed by a SHA-256 prefix of the full source path plus the
//! file's base name, so same-named files in different directories get
//! distinct backup slots and per-file fixing never races on a shared
//! basename.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::engine::FixError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// The file was restored from its backup.
    Restored,
    /// No backup exists for this file; nothing was touched.
    NoBackup,
}

/// Backup location for `file` under `backup_root`:
/// `<root>/<sha256(path)[..16]>-<basename>`.
pub fn backup_path(backup_root: &Path, file: &Path) -> PathBuf {
    let digest = Sha256::digest(file.to_string_lossy().as_bytes());
    let key: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();

    let basename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    backup_root.join(format!("{key}-{basename}"))
}

/// Copies `file` into the backup root, creating it if needed. Called before
/// any mutation; fixing a file without a confirmed backup is not allowed.
pub fn create_backup(backup_root: &Path, file: &Path) -> Result<PathBuf, FixError> {
    fs::create_dir_all(backup_root).map_err(|source| FixError::Io {
        path: backup_root.to_path_buf(),
        source,
    })?;

    let dest = backup_path(backup_root, file);
    fs::copy(file, &dest).map_err(|source| FixError::Io {
        path: file.to_path_buf(),
        source,
    })?;

    info!(file = %file.display(), backup = %dest.display(), "backup created");
    Ok(dest)
}

/// Restores `file` from its backup. A missing backup is a reported
/// condition, not an error.
pub fn rollback(backup_root: &Path, file: &Path) -> Result<RollbackOutcome, FixError> {
    let src = backup_path(backup_root, file);
    if !src.exists() {
        warn!(file = %file.display(), "no backup available");
        return Ok(RollbackOutcome::NoBackup);
    }

    fs::copy(&src, file).map_err(|source| FixError::Io {
        path: file.to_path_buf(),
        source,
    })?;

    info!(file = %file.display(), "rolled back from backup");
    Ok(RollbackOutcome::Restored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_basename_in_different_dirs_does_not_collide() {
        let root = Path::new("/tmp/backups");
        let a = backup_path(root, Path::new("src/a/Service.cls"));
        let b = backup_path(root, Path::new("src/b/Service.cls"));
        assert_ne!(a, b);
        assert!(a.to_string_lossy().ends_with("-Service.cls"));
    }

    #[test]
    fn backup_path_is_stable_per_input() {
        let root = Path::new("/tmp/backups");
        let p = Path::new("src/a/Service.cls");
        assert_eq!(backup_path(root, p), backup_path(root, p));
    }
}
