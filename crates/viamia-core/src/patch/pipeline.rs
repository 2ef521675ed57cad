//! The whole patch run: backup, unpack, patch, repack, clean up.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::archive;
use crate::config::Config;
use crate::install::{AppVersion, Platform, read_bundle_version};
use crate::patch::{ArchiveLayout, PatchError, backup_archive, patch_file, resolve_targets};

/// Progress event emitted while the pipeline runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Backup copy written and verified
    BackedUp { backup: PathBuf },
    /// Archive extraction started
    Unpacking { archive: PathBuf },
    /// Archive extracted into the working directory
    Unpacked { working_dir: PathBuf },
    /// About to rewrite a target file
    Patching { file: PathBuf },
    /// Target file rewritten
    Patched { file: PathBuf, replacements: usize },
    /// Old archive removed, new one being written
    Repacking { archive: PathBuf },
    /// New archive written
    Repacked { archive: PathBuf },
    /// Working directory being removed
    CleaningUp { working_dir: PathBuf },
    /// Pipeline finished
    Done { files_patched: usize },
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSummary {
    pub backup: PathBuf,
    pub files_patched: usize,
    pub replacements: usize,
}

/// Patch the VIA install at `install_root`.
///
/// Workflow:
/// 1. Check the archive exists (nothing is written before this)
/// 2. Back up the archive and verify the copy
/// 3. Unpack into a fresh working directory
/// 4. Check both targets exist, then patch them
/// 5. Replace the archive with one packed from the working directory
/// 6. Remove the working directory
///
/// The original archive is only deleted once step 4 has succeeded. Any
/// failure before that leaves the install as it was, plus the backup.
pub fn run_pipeline<F>(
    install_root: &Path,
    platform: Platform,
    config: &Config,
    mut on_progress: F,
) -> Result<PatchSummary, PatchError>
where
    F: FnMut(ProgressEvent),
{
    let layout = ArchiveLayout::new(install_root, platform);
    let version_hint = || detect_version(install_root, platform);
    debug!(?layout, %platform, "resolved archive layout");

    if !layout.archive.is_file() {
        return Err(PatchError::ArchiveNotFound {
            path: layout.archive.clone(),
            version: version_hint(),
        });
    }

    backup_archive(&layout.archive, &layout.backup)?;
    on_progress(ProgressEvent::BackedUp {
        backup: layout.backup.clone(),
    });

    if layout.working_dir.exists() {
        debug!(dir = %layout.working_dir.display(), "removing stale working directory");
        remove_working_dir(&layout.working_dir)?;
    }

    on_progress(ProgressEvent::Unpacking {
        archive: layout.archive.clone(),
    });
    if let Err(e) = archive::extract_all(&layout.archive, &layout.working_dir) {
        discard_working_dir(&layout.working_dir);
        return Err(e);
    }
    on_progress(ProgressEvent::Unpacked {
        working_dir: layout.working_dir.clone(),
    });

    let replacements = match patch_targets(&layout, config, version_hint, &mut on_progress) {
        Ok(replacements) => replacements,
        Err(e) => {
            discard_working_dir(&layout.working_dir);
            return Err(e);
        }
    };

    on_progress(ProgressEvent::Repacking {
        archive: layout.archive.clone(),
    });
    let repacked = repack(&layout);
    if repacked.is_ok() {
        on_progress(ProgressEvent::Repacked {
            archive: layout.archive.clone(),
        });
    }

    // The working directory goes even if repacking failed; the backup remains
    on_progress(ProgressEvent::CleaningUp {
        working_dir: layout.working_dir.clone(),
    });
    let cleaned = remove_working_dir(&layout.working_dir);
    repacked?;
    cleaned?;

    let files_patched = replacements.len();
    on_progress(ProgressEvent::Done { files_patched });

    Ok(PatchSummary {
        backup: layout.backup,
        files_patched,
        replacements: replacements.iter().sum(),
    })
}

/// Check both targets, then patch each one. Returns per-file replacement counts.
fn patch_targets<V, F>(
    layout: &ArchiveLayout,
    config: &Config,
    detect_version: V,
    on_progress: &mut F,
) -> Result<Vec<usize>, PatchError>
where
    V: FnOnce() -> Option<AppVersion>,
    F: FnMut(ProgressEvent),
{
    let targets = resolve_targets(&layout.working_dir, detect_version)?;

    let mut counts = Vec::with_capacity(targets.len());
    for target in &targets {
        on_progress(ProgressEvent::Patching {
            file: target.path.clone(),
        });
        let replacements = patch_file(&target.path, &config.replacement_url)?;
        if replacements == 0 {
            warn!(file = %target.path.display(), kind = %target.kind, "no keyboard URL found");
        }
        on_progress(ProgressEvent::Patched {
            file: target.path.clone(),
            replacements,
        });
        counts.push(replacements);
    }
    Ok(counts)
}

fn repack(layout: &ArchiveLayout) -> Result<(), PatchError> {
    fs::remove_file(&layout.archive).map_err(|e| PatchError::RepackFailed {
        reason: format!("failed to remove '{}': {}", layout.archive.display(), e),
    })?;
    archive::create_package(&layout.working_dir, &layout.archive)
}

fn remove_working_dir(dir: &Path) -> Result<(), PatchError> {
    fs::remove_dir_all(dir).map_err(|e| PatchError::CleanupFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Best-effort removal on a path that is already failing.
fn discard_working_dir(dir: &Path) {
    if dir.exists() {
        if let Err(e) = fs::remove_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "could not remove working directory");
        }
    }
}

fn detect_version(install_root: &Path, platform: Platform) -> Option<AppVersion> {
    if platform.uses_bundles() {
        read_bundle_version(install_root)
    } else {
        None
    }
}
