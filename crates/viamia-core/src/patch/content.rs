//! Swapping the keyboard definition URL inside a script bundle.
//!
//! VIA references its definitions as `"keyboards.v2.json","<base url>"` in
//! both bundles. The match works on raw bytes so nothing else in the file is
//! touched, whatever its encoding. The URL itself may contain bytes that are
//! not valid UTF-8.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::bytes::{Captures, Regex};
use tracing::debug;

use crate::patch::PatchError;

static KEYBOARDS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(keyboards\.v2\.json",")((?-u:.)+?)(")"#).expect("keyboards url pattern is valid")
});

/// Replace every keyboard definition URL in `contents` with `replacement`,
/// returning the new contents and the number of occurrences replaced.
///
/// `replacement` is inserted literally.
pub fn replace_keyboards_url(contents: &[u8], replacement: &str) -> (Vec<u8>, usize) {
    let mut count = 0;
    let replaced = KEYBOARDS_URL.replace_all(contents, |caps: &Captures| {
        count += 1;
        let mut out = Vec::with_capacity(caps[1].len() + replacement.len() + caps[3].len());
        out.extend_from_slice(&caps[1]);
        out.extend_from_slice(replacement.as_bytes());
        out.extend_from_slice(&caps[3]);
        out
    });
    (replaced.into_owned(), count)
}

/// Rewrite `path` with every keyboard definition URL replaced.
///
/// The file is always written back, even when nothing matched.
pub fn patch_file(path: &Path, replacement: &str) -> Result<usize, PatchError> {
    let file = path.display().to_string();

    let contents = fs::read(path).map_err(|e| PatchError::PatchFailed {
        file: file.clone(),
        reason: format!("failed to read file: {}", e),
    })?;

    let (patched, count) = replace_keyboards_url(&contents, replacement);

    fs::write(path, patched).map_err(|e| PatchError::PatchFailed {
        file: file.clone(),
        reason: format!("failed to write patched file: {}", e),
    })?;

    debug!(file = %file, replacements = count, "patched");
    Ok(count)
}
