//! Keeping an untouched copy of the archive before anything destructive.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::patch::PatchError;
use crate::utils::hash::hash_file;

/// Copy `archive` to `backup`, replacing any earlier backup, and check the
/// copy is present and identical before returning.
pub fn backup_archive(archive: &Path, backup: &Path) -> Result<(), PatchError> {
    let file = backup.display().to_string();

    fs::copy(archive, backup).map_err(|e| PatchError::BackupFailed {
        file: file.clone(),
        reason: format!("failed to copy archive: {}", e),
    })?;

    if !backup.is_file() {
        return Err(PatchError::BackupFailed {
            file,
            reason: "backup missing after copy".to_string(),
        });
    }

    let expected = hash_file(archive).map_err(|e| PatchError::BackupFailed {
        file: file.clone(),
        reason: format!("failed to hash archive: {}", e),
    })?;
    let actual = hash_file(backup).map_err(|e| PatchError::BackupFailed {
        file: file.clone(),
        reason: format!("failed to hash backup: {}", e),
    })?;
    if expected != actual {
        return Err(PatchError::BackupFailed {
            file,
            reason: format!("backup hash {} does not match archive hash {}", actual, expected),
        });
    }

    debug!(backup = %backup.display(), hash = %actual, "backup verified");
    Ok(())
}
