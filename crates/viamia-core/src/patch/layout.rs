use std::path::{Path, PathBuf};

use crate::install::Platform;
use crate::patch::constants::{ARCHIVE_NAME, BACKUP_NAME, WORKING_DIR_NAME};

/// Every path the pipeline touches, derived once from the install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub archive: PathBuf,
    pub backup: PathBuf,
    pub working_dir: PathBuf,
}

impl ArchiveLayout {
    pub fn new(install_root: &Path, platform: Platform) -> Self {
        let resources_dir = platform
            .resources_subpath()
            .iter()
            .fold(install_root.to_path_buf(), |path, part| path.join(part));
        ArchiveLayout {
            archive: resources_dir.join(ARCHIVE_NAME),
            backup: resources_dir.join(BACKUP_NAME),
            working_dir: resources_dir.join(WORKING_DIR_NAME),
        }
    }
}
