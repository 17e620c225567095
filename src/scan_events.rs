//! Per-file events emitted during a scan (consumed by the reporting layer)

use crate::error::HashError;
use crate::scanner::SkipReason;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ScanEvent {
    /// A file was hashed and added to the snapshot.
    Hashed { path: String, digest: String },

    /// A file was found but could not be hashed; it is left out of the snapshot.
    Skipped { path: String, error: HashError },

    /// A file was found but has no usable snapshot key; it is left out of the snapshot.
    Rejected { path: PathBuf, reason: SkipReason },

    /// A directory entry below the root could not be read; traversal continued.
    EntryUnreadable { path: Option<PathBuf>, message: String },
}

impl ScanEvent {
    pub fn is_warning(&self) -> bool {
        !matches!(self, ScanEvent::Hashed { .. })
    }
}
