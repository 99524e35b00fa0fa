//! Target directory backup and replacement
//!
//! A target directory is only ever deleted when a prior run marked it as
//! fully installer-produced; anything else is preserved by renaming it to a
//! uniquely suffixed sibling, so repeated installs can never destroy a mod
//! collection the user assembled by hand.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::installer::core::{FileOperation, InstallError, Result};

/// Sentinel written after a completed run; its presence makes the directory
/// safe to delete outright on the next install.
pub const MARKER_FILE: &str = "dont_backup";

/// Prepare `target` as a fresh, empty install destination.
///
/// Missing directories are created; marker-bearing directories are deleted
/// and recreated; anything else is renamed to `<target>_backup_<suffix>`
/// first. On success `target` exists and contains no entries.
pub async fn prepare(target: &Path, backup_name_attempts: usize) -> Result<()> {
    let exists = fs::try_exists(target)
        .await
        .map_err(|e| InstallError::fs(target, FileOperation::Metadata, e))?;
    if !exists {
        fs::create_dir_all(target)
            .await
            .map_err(|e| InstallError::fs(target, FileOperation::CreateDir, e))?;
        debug!("created target directory {}", target.display());
        return Ok(());
    }

    let marker = target.join(MARKER_FILE);
    let marked = fs::try_exists(&marker)
        .await
        .map_err(|e| InstallError::fs(&marker, FileOperation::Metadata, e))?;

    if marked {
        debug!(
            "{} carries the install marker, deleting outright",
            target.display()
        );
        fs::remove_dir_all(target)
            .await
            .map_err(|e| InstallError::fs(target, FileOperation::Delete, e))?;
    } else {
        let backup = free_backup_path(target, backup_name_attempts).await?;
        info!("backing up {} to {}", target.display(), backup.display());
        fs::rename(target, &backup)
            .await
            .map_err(|e| InstallError::fs(target, FileOperation::Rename, e))?;
    }

    fs::create_dir_all(target)
        .await
        .map_err(|e| InstallError::fs(target, FileOperation::CreateDir, e))?;
    Ok(())
}

/// Write the sentinel marking a completed install.
pub async fn write_marker(target: &Path) -> Result<()> {
    let marker = target.join(MARKER_FILE);
    fs::write(&marker, b"")
        .await
        .map_err(|e| InstallError::fs(&marker, FileOperation::Create, e))?;
    debug!("wrote install marker {}", marker.display());
    Ok(())
}

/// Generate `<target>_backup_<suffix>` with a suffix not already on disk.
///
/// The loop is bounded: suffix collisions are practically impossible, but an
/// exhausted cap must fail loudly rather than spin forever.
async fn free_backup_path(target: &Path, attempts: usize) -> Result<PathBuf> {
    let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();
    let base = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "target".to_string());

    for _ in 0..attempts {
        let candidate = parent.join(format!("{}_backup_{}", base, Uuid::new_v4().simple()));
        let taken = fs::try_exists(&candidate)
            .await
            .map_err(|e| InstallError::fs(&candidate, FileOperation::Metadata, e))?;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(InstallError::BackupCollision {
        path: target.to_path_buf(),
        attempts,
    })
}
