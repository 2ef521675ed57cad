//! Unpacking and repacking the Electron archive.
//!
//! The codec itself is the `asar` crate; these wrappers expand an archive to
//! a directory tree and pack one back, reporting failures as pipeline errors.

use std::fs::{self, File, Metadata};
use std::io::{BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Component, Path};

use asar::{AsarReader, AsarWriter};
use tracing::{debug, warn};

use crate::patch::PatchError;

fn unpack_failed(reason: String) -> PatchError {
    PatchError::UnpackFailed { reason }
}

fn repack_failed(reason: String) -> PatchError {
    PatchError::RepackFailed { reason }
}

/// Expand every file of `archive` into `dest`, creating `dest` if needed.
///
/// Entries stored in the archive's `.unpacked` sibling directory are read
/// from there.
pub fn extract_all(archive: &Path, dest: &Path) -> Result<(), PatchError> {
    let data = fs::read(archive)
        .map_err(|e| unpack_failed(format!("failed to read '{}': {}", archive.display(), e)))?;

    // A damaged header must end in an error, never abort the run
    panic::catch_unwind(AssertUnwindSafe(|| extract_from(&data, archive, dest)))
        .unwrap_or_else(|_| Err(unpack_failed(format!("'{}' is corrupt", archive.display()))))
}

fn extract_from(data: &[u8], archive: &Path, dest: &Path) -> Result<(), PatchError> {
    let reader = AsarReader::new(data, Some(archive.to_path_buf()))
        .map_err(|e| unpack_failed(format!("invalid archive '{}': {}", archive.display(), e)))?;

    fs::create_dir_all(dest)
        .map_err(|e| unpack_failed(format!("failed to create '{}': {}", dest.display(), e)))?;

    for (path, file) in reader.files() {
        if !path.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(unpack_failed(format!(
                "entry '{}' escapes the target directory",
                path.display()
            )));
        }
        let out = dest.join(path);
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| unpack_failed(format!("failed to create '{}': {}", parent.display(), e)))?;
        }
        fs::write(&out, file.data())
            .map_err(|e| unpack_failed(format!("failed to write '{}': {}", out.display(), e)))?;
    }

    debug!(
        archive = %archive.display(),
        files = reader.files().len(),
        "archive extracted"
    );
    Ok(())
}

/// Pack the directory tree at `src` into a new archive at `archive`.
pub fn create_package(src: &Path, archive: &Path) -> Result<(), PatchError> {
    let mut writer = AsarWriter::new();
    let files = add_dir(&mut writer, src, Path::new(""))?;

    let out = File::create(archive)
        .map_err(|e| repack_failed(format!("failed to create '{}': {}", archive.display(), e)))?;
    let mut out = BufWriter::new(out);
    writer
        .finalize(&mut out)
        .map_err(|e| repack_failed(format!("failed to write '{}': {}", archive.display(), e)))?;
    out.flush()
        .map_err(|e| repack_failed(format!("failed to write '{}': {}", archive.display(), e)))?;

    debug!(archive = %archive.display(), files, "archive written");
    Ok(())
}

/// Add every file under `dir` in name order. Returns the number of files added.
fn add_dir(writer: &mut AsarWriter, dir: &Path, rel: &Path) -> Result<usize, PatchError> {
    let read_failed = |e: std::io::Error| repack_failed(format!("failed to read '{}': {}", dir.display(), e));

    let mut children = fs::read_dir(dir)
        .map_err(read_failed)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_failed)?;
    children.sort();

    let mut added = 0;
    for path in children {
        let Some(name) = path.file_name() else {
            continue;
        };
        let rel_path = rel.join(name);
        let metadata = fs::symlink_metadata(&path)
            .map_err(|e| repack_failed(format!("failed to read '{}': {}", path.display(), e)))?;

        if metadata.file_type().is_symlink() {
            warn!(file = %rel_path.display(), "skipping symlink");
        } else if metadata.is_dir() {
            added += add_dir(writer, &path, &rel_path)?;
        } else {
            let bytes = fs::read(&path)
                .map_err(|e| repack_failed(format!("failed to read '{}': {}", path.display(), e)))?;
            writer
                .write_file(&rel_path, &bytes, is_executable(&metadata))
                .map_err(|e| repack_failed(format!("failed to add '{}': {}", rel_path.display(), e)))?;
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(unix)]
fn is_executable(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o100 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &Metadata) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Archive bytes with the given header JSON and data section.
    fn raw_archive(header_json: &str, data: &[u8]) -> Vec<u8> {
        let mut json = header_json.as_bytes().to_vec();
        let json_len = json.len() as u32;
        while json.len() % 4 != 0 {
            json.push(0);
        }
        let payload_size = 4 + json.len() as u32;
        let header_size = 4 + payload_size;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&header_size.to_le_bytes());
        bytes.extend_from_slice(&payload_size.to_le_bytes());
        bytes.extend_from_slice(&json_len.to_le_bytes());
        bytes.extend_from_slice(&json);
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn packed_tree_extracts_unchanged() {
        let src = tempdir().unwrap();
        fs::create_dir_all(src.path().join("app/dist")).unwrap();
        fs::write(src.path().join("package.json"), b"{\"name\":\"via\"}").unwrap();
        fs::write(src.path().join("app/main.prod.js"), b"main();").unwrap();
        fs::write(src.path().join("app/dist/renderer.prod.js"), b"render();").unwrap();
        fs::write(src.path().join("app/empty.txt"), b"").unwrap();

        let out = tempdir().unwrap();
        let archive = out.path().join("app.asar");
        create_package(src.path(), &archive).unwrap();

        let dest = out.path().join("unpacked");
        extract_all(&archive, &dest).unwrap();

        assert_eq!(fs::read(dest.join("package.json")).unwrap(), b"{\"name\":\"via\"}");
        assert_eq!(fs::read(dest.join("app/main.prod.js")).unwrap(), b"main();");
        assert_eq!(fs::read(dest.join("app/dist/renderer.prod.js")).unwrap(), b"render();");
        assert_eq!(fs::read(dest.join("app/empty.txt")).unwrap(), b"");
    }

    #[test]
    fn packing_is_deterministic() {
        let src = tempdir().unwrap();
        fs::create_dir_all(src.path().join("b")).unwrap();
        fs::write(src.path().join("b/two.js"), b"2").unwrap();
        fs::write(src.path().join("a.js"), b"1").unwrap();

        let out = tempdir().unwrap();
        create_package(src.path(), &out.path().join("first.asar")).unwrap();
        create_package(src.path(), &out.path().join("second.asar")).unwrap();

        assert_eq!(
            fs::read(out.path().join("first.asar")).unwrap(),
            fs::read(out.path().join("second.asar")).unwrap()
        );
    }

    #[test]
    fn overflowing_offset_is_an_unpack_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("app.asar");
        fs::write(
            &archive,
            raw_archive(
                r#"{"files":{"a.txt":{"size":1,"offset":"18446744073709551615"}}}"#,
                b"x",
            ),
        )
        .unwrap();

        let result = extract_all(&archive, &dir.path().join("out"));

        assert!(matches!(result, Err(PatchError::UnpackFailed { .. })));
    }

    #[test]
    fn parent_dir_entry_is_rejected() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("app.asar");
        fs::write(
            &archive,
            raw_archive(
                r#"{"files":{"..":{"files":{"evil.txt":{"size":1,"offset":"0"}}}}}"#,
                b"x",
            ),
        )
        .unwrap();
        let dest = dir.path().join("out");

        let result = extract_all(&archive, &dest);

        assert!(matches!(result, Err(PatchError::UnpackFailed { .. })));
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn missing_archive_is_an_unpack_error() {
        let dir = tempdir().unwrap();

        let result = extract_all(&dir.path().join("app.asar"), &dir.path().join("out"));

        assert!(matches!(result, Err(PatchError::UnpackFailed { .. })));
    }

    #[test]
    fn missing_source_is_a_repack_error() {
        let dir = tempdir().unwrap();

        let result = create_package(&dir.path().join("nope"), &dir.path().join("app.asar"));

        assert!(matches!(result, Err(PatchError::RepackFailed { .. })));
        assert!(!dir.path().join("app.asar").exists());
    }
}
