//! Configuration for scanning, hashing and baseline storage
//!
//! Values are read from a TOML file and handed explicitly to the scanner,
//! hasher and store constructors.
//!
//! ```toml
//! baseline_name = ".baseline"
//! chunk_size = 65536
//! algorithm = "sha256"
//! follow_links = false
//! hide_baseline = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASELINE_NAME: &str = ".baseline";
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithm used for file contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Length of the hex-encoded digest
    pub fn hex_len(&self) -> usize {
        64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reserved file name of the baseline artifact inside the scanned root
    pub baseline_name: String,
    /// Read buffer size used while hashing
    pub chunk_size: usize,
    pub algorithm: HashAlgorithm,
    /// Descend into symlinked directories
    pub follow_links: bool,
    /// Mark the baseline hidden after writing it (Windows only)
    pub hide_baseline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baseline_name: DEFAULT_BASELINE_NAME.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            algorithm: HashAlgorithm::default(),
            follow_links: false,
            hide_baseline: true,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the platform config file is
    /// used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be greater than zero".into()));
        }
        let name = self.baseline_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(|c| c == '/' || c == '\\') {
            return Err(ConfigError::Invalid(format!(
                "baseline_name must be a plain file name, got '{}'",
                name
            )));
        }
        Ok(())
    }
}

/// Platform config file location
///
/// Linux: ~/.config/fim/config.toml
/// macOS: ~/Library/Application Support/fim/config.toml
/// Windows: %APPDATA%\fim\config\config.toml
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "fim").map(|dirs| dirs.config_dir().join("config.toml"))
}
