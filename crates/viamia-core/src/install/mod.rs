//! Finding the VIA installation on the local machine.

pub mod version;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::patch::PatchError;

pub use version::{AppVersion, FIRST_UNSUPPORTED_MAJOR, read_bundle_version};

/// Windows install location, relative to the home directory
pub const WINDOWS_INSTALL_DIR: &[&str] = &["AppData", "Local", "Programs", "via"];
/// macOS application bundle
pub const MACOS_BUNDLE: &str = "/Applications/VIA.app";

/// How the host platform lays out a VIA install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Per-user install with a flat `resources/` directory
    Windows,
    /// Application bundle with `Contents/Resources/`
    MacOs,
    /// No known default location; the operator supplies the path
    Other,
}

impl Platform {
    /// Platform of the running binary.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Directory holding `app.asar`, relative to the install root.
    pub fn resources_subpath(&self) -> &'static [&'static str] {
        match self {
            Platform::MacOs => &["Contents", "Resources"],
            Platform::Windows | Platform::Other => &["resources"],
        }
    }

    /// Whether installs on this platform are application bundles.
    pub fn uses_bundles(&self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Other => write!(f, "other"),
        }
    }
}

/// Default install location for a platform, if one is known.
pub fn default_install_guess(platform: Platform, home: Option<&Path>) -> Option<PathBuf> {
    match platform {
        Platform::Windows => home.map(|home| {
            WINDOWS_INSTALL_DIR
                .iter()
                .fold(home.to_path_buf(), |path, part| path.join(part))
        }),
        Platform::MacOs => Some(PathBuf::from(MACOS_BUNDLE)),
        Platform::Other => None,
    }
}

/// Default install location for the running platform and user.
pub fn detect_install_guess() -> Option<PathBuf> {
    let home = dirs::home_dir();
    default_install_guess(Platform::current(), home.as_deref())
}

/// Pick the install root: the guess if it exists, otherwise whatever `ask`
/// returns. `ask` is called at most once.
pub fn resolve_install_root<F>(guess: Option<PathBuf>, ask: F) -> Result<PathBuf, PatchError>
where
    F: FnOnce() -> io::Result<String>,
{
    if let Some(guess) = guess {
        if guess.exists() {
            debug!(path = %guess.display(), "install auto-detected");
            return Ok(guess);
        }
        debug!(path = %guess.display(), "default install location missing");
    }

    let answer = ask().map_err(|e| PatchError::PromptFailed {
        reason: e.to_string(),
    })?;
    let path = PathBuf::from(clean_user_path(&answer));
    if path.as_os_str().is_empty() || !path.exists() {
        return Err(PatchError::InstallNotFound { path });
    }
    Ok(path)
}

/// Strip whitespace and one pair of surrounding quotes, as left behind when a
/// folder is dragged into a terminal.
fn clean_user_path(answer: &str) -> &str {
    let trimmed = answer.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}
