//! Environment-derived configuration.

use std::path::PathBuf;

/// Where quire keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory; also holds the log file.
    pub data_dir: PathBuf,
    /// Markdown documents and the notes sidecar.
    pub stash_dir: PathBuf,
    /// Key material.
    pub keys_dir: PathBuf,
}

impl Config {
    /// Name of the log file inside [`Config::data_dir`].
    pub const LOG_FILE: &'static str = "quire.log";

    /// Read `QUIRE_DATA_DIR`, `QUIRE_STASH_DIR` and `QUIRE_KEYS_DIR`.
    ///
    /// Unset directories default to `<platform data dir>/quire`, then
    /// `stash/` and `keys/` below it.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name).map(PathBuf::from))
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let data_dir = lookup("QUIRE_DATA_DIR").unwrap_or_else(|| {
            dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("quire")
        });
        let stash_dir = lookup("QUIRE_STASH_DIR").unwrap_or_else(|| data_dir.join("stash"));
        let keys_dir = lookup("QUIRE_KEYS_DIR").unwrap_or_else(|| data_dir.join("keys"));
        Self { data_dir, stash_dir, keys_dir }
    }

    /// Rooted at `dir`, with the default layout below it.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        Self { stash_dir: data_dir.join("stash"), keys_dir: data_dir.join("keys"), data_dir }
    }

    /// Full path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(Self::LOG_FILE)
    }
}
