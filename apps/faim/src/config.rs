//! # Configuration
//!
//! Optional `faim.toml` settings. Command-line flags override file values;
//! a missing file means defaults.
//!
//! ```toml
//! snapshot = "class/faim-qirf-demo.json"
//! author = "instructor"
//! log_filter = "faim=debug"
//! ```

use faim_core::FaimError;
use faim_core::primitives::{DEFAULT_AUTHOR, SNAPSHOT_FILE_NAME};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "faim.toml";

/// Maximum accepted configuration file size (64 KiB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Settings read from `faim.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Snapshot file the CLI reads and writes.
    pub snapshot: Option<PathBuf>,
    /// Author tag for proposed glossary terms.
    pub author: Option<String>,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Config {
    /// Parse configuration text.
    pub fn from_toml(text: &str) -> Result<Self, FaimError> {
        toml::from_str(text).map_err(|e| FaimError::Parse(format!("Invalid config: {}", e)))
    }

    /// Load configuration from a file, or defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, FaimError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| FaimError::Io(format!("Cannot read config metadata: {}", e)))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(FaimError::InvalidInput(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| FaimError::Io(format!("Read config '{}': {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Snapshot path: the flag if given, else the file setting, else the default name.
    #[must_use]
    pub fn snapshot_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.snapshot.clone())
            .unwrap_or_else(|| PathBuf::from(SNAPSHOT_FILE_NAME))
    }

    /// Author tag: the flag if non-blank, else the file setting, else `"student"`.
    #[must_use]
    pub fn author(&self, flag: Option<&str>) -> String {
        flag.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| self.author.clone())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
    }
}
