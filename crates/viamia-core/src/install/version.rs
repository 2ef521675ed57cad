//! Reading the application version from a macOS bundle's Info.plist.
//!
//! Only used to make diagnostics more helpful; any failure here yields
//! `None` rather than an error. The lookup understands XML plists only, so a
//! binary-format Info.plist also gives `None`.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// First major VIA release whose archive no longer carries the patched scripts
pub const FIRST_UNSUPPORTED_MAJOR: u32 = 3;

/// Keys checked, in order, for a version string
const VERSION_KEYS: &[&str] = &["CFBundleShortVersionString", "CFBundleVersion"];

static PLIST_STRING_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<key>\s*([^<]+?)\s*</key>\s*<string>\s*([^<]*?)\s*</string>")
        .expect("plist entry pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppVersion {
    pub raw: String,
    pub major: Option<u32>,
}

impl AppVersion {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let digits: String = raw
            .trim_start_matches(['v', 'V'])
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        AppVersion {
            raw: raw.to_string(),
            major: digits.parse().ok(),
        }
    }

    /// True when the major version is known and past the supported range.
    pub fn is_unsupported(&self) -> bool {
        self.major.is_some_and(|major| major >= FIRST_UNSUPPORTED_MAJOR)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Look up a string value in XML plist text.
pub fn plist_string(contents: &str, key: &str) -> Option<String> {
    PLIST_STRING_ENTRY
        .captures_iter(contents)
        .find(|caps| &caps[1] == key)
        .map(|caps| caps[2].to_string())
}

/// Version of the bundle rooted at `bundle_root`, from `Contents/Info.plist`.
pub fn read_bundle_version(bundle_root: &Path) -> Option<AppVersion> {
    let plist_path = bundle_root.join("Contents").join("Info.plist");
    let contents = match fs::read_to_string(&plist_path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %plist_path.display(), error = %e, "no readable version descriptor");
            return None;
        }
    };

    VERSION_KEYS
        .iter()
        .find_map(|key| plist_string(&contents, key))
        .filter(|raw| !raw.is_empty())
        .map(|raw| AppVersion::parse(&raw))
}
