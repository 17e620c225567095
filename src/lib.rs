//! fim library crate
//!
//! Records per-file content digests for a directory tree and reports which
//! files were added, deleted or modified since. The binary is a thin CLI over
//! [`monitor::Monitor`].

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod monitor;
pub mod output;
pub mod progress;
pub mod scan_events;
pub mod scanner;
pub mod snapshot;
pub mod store;
pub mod theme;

pub use config::{Config, HashAlgorithm};
pub use diff::{diff, DiffReport};
pub use error::{FimError, HashError, HashErrorKind, ScanError, StoreError};
pub use hasher::ContentHasher;
pub use monitor::{CheckSummary, InitSummary, Monitor};
pub use scanner::{ScanOutcome, SkipReason, SkippedFile, TreeScanner};
pub use snapshot::{FileEntry, Snapshot};
pub use store::BaselineStore;
