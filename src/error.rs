//! Error taxonomy for hashing, scanning, baseline storage and the two
//! top-level operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single file could not be hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashErrorKind {
    /// The OS refused to open or read the file
    PermissionDenied,
    /// The file disappeared between enumeration and read
    Vanished,
    /// Any other I/O fault
    Io,
}

impl HashErrorKind {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::Vanished,
            _ => Self::Io,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission denied",
            Self::Vanished => "file vanished",
            Self::Io => "I/O error",
        }
    }
}

/// A file that could not be hashed. Never fatal to a scan.
#[derive(Debug, Error)]
#[error("{}: {} ({source})", .path.display(), .kind.as_str())]
pub struct HashError {
    pub kind: HashErrorKind,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl HashError {
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            kind: HashErrorKind::from_io(&source),
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read directory {}: {source}", .root.display())]
    RootUnreadable {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("baseline not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("baseline at {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to read baseline {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write baseline {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that abort an `initialize` or `check` operation
#[derive(Debug, Error)]
pub enum FimError {
    #[error("directory not found: {}", .0.display())]
    InvalidTarget(PathBuf),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, FimError>;
