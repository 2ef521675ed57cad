//! The two scripts inside the unpacked archive that carry the URL.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::install::AppVersion;
use crate::patch::PatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Electron main process bundle
    MainProcess,
    /// Renderer bundle
    Renderer,
}

impl TargetKind {
    pub const ALL: [TargetKind; 2] = [TargetKind::MainProcess, TargetKind::Renderer];

    /// Location inside the unpacked archive.
    pub fn relative_path(&self) -> &'static [&'static str] {
        match self {
            TargetKind::MainProcess => &["app", "main.prod.js"],
            TargetKind::Renderer => &["app", "dist", "renderer.prod.js"],
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::MainProcess => write!(f, "main process script"),
            TargetKind::Renderer => write!(f, "renderer script"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchTarget {
    pub kind: TargetKind,
    pub path: PathBuf,
}

impl PatchTarget {
    fn new(kind: TargetKind, working_dir: &Path) -> Self {
        let path = kind
            .relative_path()
            .iter()
            .fold(working_dir.to_path_buf(), |path, part| path.join(part));
        PatchTarget { kind, path }
    }
}

/// Resolve both targets under `working_dir`, failing on the first one that is
/// missing. `detect_version` is only called on failure, to annotate the error
/// and flag versions past the supported range.
pub fn resolve_targets<F>(working_dir: &Path, detect_version: F) -> Result<Vec<PatchTarget>, PatchError>
where
    F: FnOnce() -> Option<AppVersion>,
{
    let targets: Vec<PatchTarget> = TargetKind::ALL
        .iter()
        .map(|kind| PatchTarget::new(*kind, working_dir))
        .collect();

    if let Some(missing) = targets.iter().find(|t| !t.path.is_file()) {
        let version = detect_version();
        let incompatible = version.as_ref().is_some_and(AppVersion::is_unsupported);
        return Err(PatchError::TargetNotFound {
            path: missing.path.clone(),
            version,
            incompatible,
        });
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_targets(dir: &Path, kinds: &[TargetKind]) {
        for kind in kinds {
            let target = PatchTarget::new(*kind, dir);
            fs::create_dir_all(target.path.parent().unwrap()).unwrap();
            fs::write(&target.path, b"script").unwrap();
        }
    }

    #[test]
    fn resolves_both_targets() {
        let dir = tempdir().unwrap();
        create_targets(dir.path(), &TargetKind::ALL);

        let targets = resolve_targets(dir.path(), || None).unwrap();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].path, dir.path().join("app").join("main.prod.js"));
        assert_eq!(
            targets[1].path,
            dir.path().join("app").join("dist").join("renderer.prod.js")
        );
    }

    #[test]
    fn names_first_missing_target() {
        let dir = tempdir().unwrap();

        let result = resolve_targets(dir.path(), || None);

        assert_eq!(
            result,
            Err(PatchError::TargetNotFound {
                path: dir.path().join("app").join("main.prod.js"),
                version: None,
                incompatible: false,
            })
        );
    }

    #[test]
    fn missing_renderer_is_reported() {
        let dir = tempdir().unwrap();
        create_targets(dir.path(), &[TargetKind::MainProcess]);

        let result = resolve_targets(dir.path(), || Some(AppVersion::parse("3.1.0")));

        match result {
            Err(PatchError::TargetNotFound {
                path,
                version,
                incompatible,
            }) => {
                assert!(path.ends_with("renderer.prod.js"));
                assert_eq!(version.unwrap().major, Some(3));
                assert!(incompatible);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn supported_version_is_not_flagged() {
        let dir = tempdir().unwrap();

        let result = resolve_targets(dir.path(), || Some(AppVersion::parse("1.3.1")));

        match result {
            Err(PatchError::TargetNotFound {
                version,
                incompatible,
                ..
            }) => {
                assert_eq!(version.unwrap().raw, "1.3.1");
                assert!(!incompatible);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn version_not_read_when_targets_exist() {
        let dir = tempdir().unwrap();
        create_targets(dir.path(), &TargetKind::ALL);

        let result = resolve_targets(dir.path(), || panic!("version should not be read"));

        assert!(result.is_ok());
    }
}
