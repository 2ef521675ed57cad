/// URL substituted into VIA when no argument is given.
pub const DEFAULT_URL: &str = "https://viamia.github.io";

/// Run configuration, built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Value written in place of VIA's keyboard definition URL.
    /// Not validated; it is embedded verbatim into the patched scripts.
    pub replacement_url: String,
}

impl Config {
    pub fn new(replacement_url: Option<String>) -> Self {
        Config {
            replacement_url: replacement_url.unwrap_or_else(|| DEFAULT_URL.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}
