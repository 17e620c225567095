use crate::config::Config;
use crate::error::{HashErrorKind, ScanError};
use crate::hasher::ContentHasher;
use crate::scan_events::ScanEvent;
use crate::snapshot::Snapshot;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Something found while walking the tree
#[derive(Debug)]
pub enum WalkItem {
    /// A regular file (or a symlink to one) to be hashed
    File { path: PathBuf, key: String },
    /// A file whose relative path cannot be stored as a UTF-8 key
    NonUtf8Name { path: PathBuf },
    /// An entry below the root that could not be read
    Unreadable { path: Option<PathBuf>, message: String },
}

/// Lazy, non-restartable sequence of files under a root
///
/// Backed by walkdir's explicit directory stack, so deep trees never recurse.
pub struct FileWalk<'a> {
    root: PathBuf,
    baseline_name: &'a OsStr,
    follow_links: bool,
    inner: walkdir::IntoIter,
}

impl Iterator for FileWalk<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(WalkItem::Unreadable {
                        path: e.path().map(Path::to_path_buf),
                        message: e.to_string(),
                    });
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            // The baseline artifact never belongs in a snapshot, at any depth
            if entry.file_name() == self.baseline_name {
                continue;
            }

            let is_candidate = if file_type.is_file() {
                true
            } else if file_type.is_symlink() && !self.follow_links {
                // Hash through links to regular files, never descend linked dirs.
                // Dangling links are handed to the hasher so they surface as skips.
                match fs::metadata(entry.path()) {
                    Ok(meta) => meta.is_file(),
                    Err(_) => true,
                }
            } else {
                false
            };

            if !is_candidate {
                continue;
            }

            let path = entry.into_path();
            return Some(match snapshot_key(&self.root, &path) {
                Some(key) => WalkItem::File { path, key },
                None => WalkItem::NonUtf8Name { path },
            });
        }
    }
}

/// Why a file found by the walk is missing from the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unhashable(HashErrorKind),
    /// The relative path is not valid UTF-8
    NonUtf8Name,
    /// Another file already produced the same key
    DuplicateKey,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Unhashable(kind) => kind.as_str(),
            SkipReason::NonUtf8Name => "name is not valid UTF-8",
            SkipReason::DuplicateKey => "duplicate path key",
        }
    }
}

/// Files that were found but left out of the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedFile>,
    pub unreadable_entries: usize,
}

/// Walks a directory tree and hashes every regular file in it
#[derive(Debug, Clone)]
pub struct TreeScanner {
    hasher: ContentHasher,
    baseline_name: String,
    follow_links: bool,
}

impl TreeScanner {
    pub fn new(hasher: ContentHasher, baseline_name: impl Into<String>) -> Self {
        Self {
            hasher,
            baseline_name: baseline_name.into(),
            follow_links: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ContentHasher::new(config.algorithm, config.chunk_size),
            config.baseline_name.clone(),
        )
        .follow_links(config.follow_links)
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Enumerate candidate files under `root`
    ///
    /// Fails only if `root` itself cannot be read.
    pub fn files(&self, root: &Path) -> Result<FileWalk<'_>, ScanError> {
        fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
            root: root.to_path_buf(),
            source,
        })?;

        let inner = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter();

        Ok(FileWalk {
            root: root.to_path_buf(),
            baseline_name: OsStr::new(&self.baseline_name),
            follow_links: self.follow_links,
            inner,
        })
    }

    pub fn scan(&self, root: &Path) -> Result<ScanOutcome, ScanError> {
        self.scan_with(root, |_| {})
    }

    /// Scan `root`, reporting every hashed or skipped file to `on_event`
    pub fn scan_with<F>(&self, root: &Path, mut on_event: F) -> Result<ScanOutcome, ScanError>
    where
        F: FnMut(&ScanEvent),
    {
        debug!(root = %root.display(), algorithm = self.hasher.algorithm().as_str(), "scan started");
        let mut outcome = ScanOutcome::default();
        let mut seen = HashSet::new();

        for item in self.files(root)? {
            match item {
                WalkItem::File { path, key } => {
                    if !seen.insert(key.clone()) {
                        reject(&mut outcome, &mut on_event, path, SkipReason::DuplicateKey);
                        continue;
                    }
                    match self.hasher.hash(&path) {
                        Ok(digest) => {
                            on_event(&ScanEvent::Hashed {
                                path: key.clone(),
                                digest: digest.clone(),
                            });
                            let previous = outcome.snapshot.insert(key, digest);
                            debug_assert!(previous.is_none());
                        }
                        Err(error) => {
                            debug!(path = %key, kind = error.kind.as_str(), "skipping unhashable file");
                            let skipped = SkippedFile {
                                path: key.clone(),
                                reason: SkipReason::Unhashable(error.kind),
                                message: error.source.to_string(),
                            };
                            on_event(&ScanEvent::Skipped { path: key, error });
                            outcome.skipped.push(skipped);
                        }
                    }
                }
                WalkItem::NonUtf8Name { path } => {
                    reject(&mut outcome, &mut on_event, path, SkipReason::NonUtf8Name);
                }
                WalkItem::Unreadable { path, message } => {
                    debug!(?path, %message, "skipping unreadable entry");
                    outcome.unreadable_entries += 1;
                    on_event(&ScanEvent::EntryUnreadable { path, message });
                }
            }
        }

        info!(
            root = %root.display(),
            files = outcome.snapshot.len(),
            skipped = outcome.skipped.len(),
            unreadable = outcome.unreadable_entries,
            "scan finished"
        );
        Ok(outcome)
    }
}

/// Record a file that was found but cannot be keyed
fn reject<F>(outcome: &mut ScanOutcome, on_event: &mut F, path: PathBuf, reason: SkipReason)
where
    F: FnMut(&ScanEvent),
{
    debug!(path = %path.display(), reason = reason.as_str(), "skipping file");
    outcome.skipped.push(SkippedFile {
        path: path.to_string_lossy().into_owned(),
        reason,
        message: reason.as_str().to_string(),
    });
    on_event(&ScanEvent::Rejected { path, reason });
}

/// Snapshot key for `path`: relative to `root`, `/`-separated
///
/// Keys stay identical however the root was spelled on the command line.
/// Returns `None` when a component is not valid UTF-8, since a lossy
/// conversion could give two different files the same key.
pub fn snapshot_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut key = String::new();
    for component in relative.components() {
        if let Component::Normal(name) = component {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(name.to_str()?);
        }
    }
    Some(key)
}
