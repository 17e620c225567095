//! Baseline persistence
//!
//! The baseline lives at `<root>/<baseline_name>` as a JSON object mapping
//! root-relative paths to lowercase hex digests, keys sorted and indented so
//! two baselines can be compared by eye.

use crate::config::{Config, HashAlgorithm};
use crate::error::StoreError;
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct BaselineStore {
    file_name: String,
    algorithm: HashAlgorithm,
    hide: bool,
}

impl BaselineStore {
    pub fn new(file_name: impl Into<String>, algorithm: HashAlgorithm) -> Self {
        Self {
            file_name: file_name.into(),
            algorithm,
            hide: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.baseline_name.clone(), config.algorithm).hidden(config.hide_baseline)
    }

    /// Mark the artifact hidden after saving (Windows only)
    pub fn hidden(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    /// Location of the baseline artifact for `root`
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(&self.file_name)
    }

    /// Write `snapshot` as the baseline for `root`, replacing any previous one
    ///
    /// Content goes to a uniquely named temp file in `root` and is renamed
    /// into place, so no other file in the tree is ever touched.
    pub fn save(&self, root: &Path, snapshot: &Snapshot) -> Result<PathBuf, StoreError> {
        let path = self.path(root);
        let write_err = |source: io::Error| StoreError::Write {
            path: path.clone(),
            source,
        };

        let json = to_pretty_json(snapshot).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(root).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        platform::prepare_overwrite(&path);
        // a failed persist drops the temp file, which removes it
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        debug!(path = %path.display(), entries = snapshot.len(), "baseline written");

        if self.hide {
            if let Err(e) = platform::hide(&path) {
                warn!(path = %path.display(), error = %e, "could not mark baseline hidden");
            }
        }

        Ok(path)
    }

    /// Read the baseline for `root`
    pub fn load(&self, root: &Path) -> Result<Snapshot, StoreError> {
        let path = self.path(root);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { path });
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StoreError::Corrupt {
                    path,
                    reason: "not valid UTF-8".to_string(),
                });
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let expected_len = self.algorithm.hex_len();
        for (file, digest) in &snapshot {
            if !is_hex_digest(digest, expected_len) {
                return Err(StoreError::Corrupt {
                    path,
                    reason: format!("invalid digest for '{}'", file),
                });
            }
        }

        debug!(path = %path.display(), entries = snapshot.len(), "baseline loaded");
        Ok(snapshot)
    }
}

/// JSON with four-space indentation
fn to_pretty_json(snapshot: &Snapshot) -> io::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    snapshot.serialize(&mut ser).map_err(io::Error::from)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn is_hex_digest(digest: &str, len: usize) -> bool {
    digest.len() == len && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(windows)]
mod platform {
    use std::io;
    use std::os::windows::fs::MetadataExt;
    use std::path::Path;
    use windows::core::HSTRING;
    use windows::Win32::Storage::FileSystem::{
        SetFileAttributesW, FILE_ATTRIBUTE_HIDDEN, FILE_FLAGS_AND_ATTRIBUTES,
    };

    fn set_attributes(path: &Path, attrs: u32) -> io::Result<()> {
        let wide = HSTRING::from(path.as_os_str());
        unsafe { SetFileAttributesW(&wide, FILE_FLAGS_AND_ATTRIBUTES(attrs)) }
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    /// A hidden target can refuse replacement, so clear the flag first
    pub fn prepare_overwrite(path: &Path) {
        if let Ok(meta) = std::fs::metadata(path) {
            let attrs = meta.file_attributes();
            if attrs & FILE_ATTRIBUTE_HIDDEN.0 != 0 {
                let _ = set_attributes(path, attrs & !FILE_ATTRIBUTE_HIDDEN.0);
            }
        }
    }

    pub fn hide(path: &Path) -> io::Result<()> {
        let attrs = std::fs::metadata(path)?.file_attributes();
        set_attributes(path, attrs | FILE_ATTRIBUTE_HIDDEN.0)
    }
}

#[cfg(not(windows))]
mod platform {
    use std::io;
    use std::path::Path;

    pub fn prepare_overwrite(_path: &Path) {}

    // Dot-prefixed names are already hidden by convention
    pub fn hide(_path: &Path) -> io::Result<()> {
        Ok(())
    }
}
