//! The two integrity operations: `initialize` records a baseline, `check`
//! compares the tree against it.

use crate::config::Config;
use crate::diff::{self, DiffReport};
use crate::error::{FimError, Result};
use crate::scan_events::ScanEvent;
use crate::scanner::{SkippedFile, TreeScanner};
use crate::store::BaselineStore;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of a successful `initialize`
#[derive(Debug)]
pub struct InitSummary {
    pub baseline_path: PathBuf,
    pub files: usize,
    pub skipped: Vec<SkippedFile>,
    pub unreadable_entries: usize,
}

/// Result of a successful `check`
#[derive(Debug)]
pub struct CheckSummary {
    pub baseline_path: PathBuf,
    pub baseline_files: usize,
    pub current_files: usize,
    pub report: DiffReport,
    pub skipped: Vec<SkippedFile>,
    pub unreadable_entries: usize,
}

#[derive(Debug, Clone)]
pub struct Monitor {
    scanner: TreeScanner,
    store: BaselineStore,
}

impl Monitor {
    pub fn new(scanner: TreeScanner, store: BaselineStore) -> Self {
        Self { scanner, store }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(TreeScanner::from_config(config), BaselineStore::from_config(config))
    }

    /// Scan `target` and write its baseline
    pub fn initialize<F>(&self, target: &Path, on_event: F) -> Result<InitSummary>
    where
        F: FnMut(&ScanEvent),
    {
        validate_target(target)?;
        let outcome = self.scanner.scan_with(target, on_event)?;
        let baseline_path = self.store.save(target, &outcome.snapshot)?;

        info!(
            target = %target.display(),
            files = outcome.snapshot.len(),
            "baseline initialized"
        );
        Ok(InitSummary {
            baseline_path,
            files: outcome.snapshot.len(),
            skipped: outcome.skipped,
            unreadable_entries: outcome.unreadable_entries,
        })
    }

    /// Compare the current state of `target` with its baseline
    pub fn check<F>(&self, target: &Path, on_event: F) -> Result<CheckSummary>
    where
        F: FnMut(&ScanEvent),
    {
        validate_target(target)?;
        let baseline = self.store.load(target)?;
        let outcome = self.scanner.scan_with(target, on_event)?;
        let report = diff::diff(&baseline, &outcome.snapshot);

        info!(
            target = %target.display(),
            added = report.added.len(),
            deleted = report.deleted.len(),
            modified = report.modified.len(),
            "integrity check finished"
        );
        Ok(CheckSummary {
            baseline_path: self.store.path(target),
            baseline_files: baseline.len(),
            current_files: outcome.snapshot.len(),
            report,
            skipped: outcome.skipped,
            unreadable_entries: outcome.unreadable_entries,
        })
    }
}

/// Both operations refuse to run on anything but an existing directory
pub fn validate_target(target: &Path) -> Result<()> {
    if target.is_dir() {
        Ok(())
    } else {
        Err(FimError::InvalidTarget(target.to_path_buf()))
    }
}
