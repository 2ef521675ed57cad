use std::fmt;
use std::path::PathBuf;

use crate::install::{AppVersion, FIRST_UNSUPPORTED_MAJOR};

/// Error type for the patch pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Install directory does not exist
    InstallNotFound { path: PathBuf },
    /// Could not read the operator's answer
    PromptFailed { reason: String },
    /// `app.asar` missing from the install
    ArchiveNotFound { path: PathBuf, version: Option<AppVersion> },
    /// A script to patch is missing from the unpacked archive. `incompatible`
    /// is set when the detected version is past the supported range.
    TargetNotFound {
        path: PathBuf,
        version: Option<AppVersion>,
        incompatible: bool,
    },
    /// Backup copy could not be made or verified
    BackupFailed { file: String, reason: String },
    /// Archive could not be unpacked
    UnpackFailed { reason: String },
    /// A target file could not be rewritten
    PatchFailed { file: String, reason: String },
    /// Archive could not be rebuilt
    RepackFailed { reason: String },
    /// Working directory could not be removed
    CleanupFailed { path: PathBuf, reason: String },
}

impl PatchError {
    /// True for "something expected is missing" failures, where nothing has
    /// been modified, as opposed to I/O trouble mid-run.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PatchError::InstallNotFound { .. }
                | PatchError::ArchiveNotFound { .. }
                | PatchError::TargetNotFound { .. }
        )
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchError::InstallNotFound { path } => {
                write!(f, "path not found: '{}'", path.display())
            }
            PatchError::PromptFailed { reason } => {
                write!(f, "could not read input: {}", reason)
            }
            PatchError::ArchiveNotFound { path, version } => {
                write!(
                    f,
                    "app.asar resources could not be found at '{}'. Perhaps VIA was updated.",
                    path.display()
                )?;
                if let Some(version) = version {
                    write!(f, " Detected VIA version {}.", version)?;
                }
                Ok(())
            }
            PatchError::TargetNotFound {
                path,
                version,
                incompatible,
            } => {
                write!(
                    f,
                    "target file '{}' could not be found. Perhaps VIA was updated.",
                    path.display()
                )?;
                if let (true, Some(version)) = (*incompatible, version) {
                    write!(
                        f,
                        " Detected VIA version {}; versions {}.x and later are not supported.",
                        version, FIRST_UNSUPPORTED_MAJOR
                    )?;
                }
                Ok(())
            }
            PatchError::BackupFailed { file, reason } => {
                write!(f, "backup failed for '{}': {}", file, reason)
            }
            PatchError::UnpackFailed { reason } => {
                write!(f, "unpacking failed: {}", reason)
            }
            PatchError::PatchFailed { file, reason } => {
                write!(f, "patch failed for '{}': {}", file, reason)
            }
            PatchError::RepackFailed { reason } => {
                write!(f, "repacking failed: {}", reason)
            }
            PatchError::CleanupFailed { path, reason } => {
                write!(f, "could not remove '{}': {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for PatchError {}
