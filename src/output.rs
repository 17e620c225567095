use crate::error::{FimError, StoreError};
use crate::monitor::{CheckSummary, InitSummary};
use crate::progress;
use crate::scan_events::ScanEvent;
use crate::scanner::SkippedFile;
use crate::theme::Theme;
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,       // Only errors and skipped-file warnings
    Normal,      // Standard output
    Verbose,     // Every hashed file
    VeryVerbose, // Hashed files with their digests
}

/// Prints scan events as they arrive and drives the spinner
pub struct ScanReporter {
    mode: OutputMode,
    spinner: Option<ProgressBar>,
}

impl ScanReporter {
    /// `show_progress` is false for machine-readable output
    pub fn new(mode: OutputMode, show_progress: bool, message: &str) -> Self {
        let spinner = if show_progress && mode == OutputMode::Normal {
            Some(progress::create_spinner(message))
        } else {
            None
        };
        Self { mode, spinner }
    }

    pub fn on_event(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Hashed { path, digest } => {
                if let Some(ref sp) = self.spinner {
                    sp.inc(1);
                }
                match self.mode {
                    OutputMode::Verbose => {
                        self.print(|| println!("  {} {}", Theme::success("[+]"), path));
                    }
                    OutputMode::VeryVerbose => {
                        self.print(|| {
                            println!("  {} {}  {}", Theme::success("[+]"), path, Theme::muted(digest))
                        });
                    }
                    _ => {}
                }
            }
            ScanEvent::Skipped { path, error } => {
                self.print(|| {
                    eprintln!(
                        "  {} Skipping {} ({}: {})",
                        Theme::warning_msg("[!]"),
                        path,
                        error.kind.as_str(),
                        error.source
                    )
                });
            }
            ScanEvent::Rejected { path, reason } => {
                self.print(|| {
                    eprintln!(
                        "  {} Skipping {} ({})",
                        Theme::warning_msg("[!]"),
                        path.display(),
                        reason.as_str()
                    )
                });
            }
            ScanEvent::EntryUnreadable { path, message } => {
                let shown = path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                self.print(|| {
                    eprintln!(
                        "  {} Cannot read {} ({})",
                        Theme::warning_msg("[!]"),
                        shown,
                        message
                    )
                });
            }
        }
    }

    fn print<F: FnOnce()>(&self, f: F) {
        match self.spinner {
            Some(ref sp) => sp.suspend(f),
            None => f(),
        }
    }

    pub fn finish(self) {
        if let Some(sp) = self.spinner {
            progress::finish_and_clear(&sp);
        }
    }
}

pub fn print_scan_start(target: &Path, mode: OutputMode, verb: &str) {
    if mode == OutputMode::Quiet {
        return;
    }
    println!(
        "{} {} {}",
        Theme::info("[*]"),
        verb,
        Theme::primary(&target.display().to_string())
    );
}

pub fn print_init_summary(summary: &InitSummary, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    println!();
    println!("{}", Theme::success("[SUCCESS] Baseline created!"));
    println!(
        "{} Saved hashes for {} files to {}",
        Theme::info("[*]"),
        Theme::value(&summary.files.to_string()),
        Theme::muted(&summary.baseline_path.display().to_string())
    );
    print_skipped_note(&summary.skipped, summary.unreadable_entries);
}

pub fn print_check_report(summary: &CheckSummary, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    let report = &summary.report;
    println!();
    println!("{}", Theme::header("Integrity Check Report"));
    println!("{}", Theme::divider_bold(50));

    if report.is_clean() {
        println!();
        println!(
            "{}",
            Theme::success("[+] All files are intact. No changes detected.")
        );
    } else {
        print_path_section("[!] MODIFIED FILES", &report.modified, Theme::danger);
        print_path_section("[!] NEW FILES", &report.added, Theme::warning_msg);
        print_path_section("[!] DELETED FILES", &report.deleted, Theme::warning_msg);
    }

    println!();
    println!("{}", Theme::divider(50));
    println!(
        "{} baseline, {} current, {} unchanged, {} modified, {} added, {} deleted",
        Theme::value(&summary.baseline_files.to_string()),
        Theme::value(&summary.current_files.to_string()),
        Theme::value(&report.unchanged.to_string()),
        Theme::value(&report.modified.len().to_string()),
        Theme::value(&report.added.len().to_string()),
        Theme::value(&report.deleted.len().to_string()),
    );
    print_skipped_note(&summary.skipped, summary.unreadable_entries);
}

fn print_path_section(
    title: &str,
    paths: &BTreeSet<String>,
    style: fn(&str) -> colored::ColoredString,
) {
    if paths.is_empty() {
        return;
    }
    println!();
    println!("{} ({})", style(title), paths.len());
    for path in paths {
        println!("  - {}", path);
    }
}

fn print_skipped_note(skipped: &[SkippedFile], unreadable_entries: usize) {
    if !skipped.is_empty() {
        println!();
        println!(
            "{} {} file(s) could not be read and are not covered:",
            Theme::warning_msg("[!]"),
            skipped.len()
        );
        for s in skipped {
            println!("  - {} {}", s.path, Theme::muted(&format!("({})", s.message)));
        }
    }
    if unreadable_entries > 0 {
        println!(
            "{} {} directory entr{} could not be read; files below them are not covered",
            Theme::warning_msg("[!]"),
            unreadable_entries,
            if unreadable_entries == 1 { "y" } else { "ies" }
        );
    }
}

#[derive(Serialize)]
struct JsonCheck<'a> {
    version: &'static str,
    timestamp: String,
    target: String,
    baseline: String,
    status: &'static str,
    summary: JsonSummary,
    modified: &'a BTreeSet<String>,
    added: &'a BTreeSet<String>,
    deleted: &'a BTreeSet<String>,
    skipped: Vec<JsonSkipped<'a>>,
}

#[derive(Serialize)]
struct JsonSummary {
    baseline_files: usize,
    current_files: usize,
    unchanged: usize,
    modified: usize,
    added: usize,
    deleted: usize,
    skipped: usize,
    unreadable_entries: usize,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    path: &'a str,
    reason: &'static str,
    message: &'a str,
}

pub fn check_json(target: &Path, summary: &CheckSummary) -> serde_json::Result<String> {
    let report = &summary.report;
    let json = JsonCheck {
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        target: target.display().to_string(),
        baseline: summary.baseline_path.display().to_string(),
        status: if report.is_clean() { "clean" } else { "drift" },
        summary: JsonSummary {
            baseline_files: summary.baseline_files,
            current_files: summary.current_files,
            unchanged: report.unchanged,
            modified: report.modified.len(),
            added: report.added.len(),
            deleted: report.deleted.len(),
            skipped: summary.skipped.len(),
            unreadable_entries: summary.unreadable_entries,
        },
        modified: &report.modified,
        added: &report.added,
        deleted: &report.deleted,
        skipped: summary
            .skipped
            .iter()
            .map(|s| JsonSkipped {
                path: &s.path,
                reason: s.reason.as_str(),
                message: &s.message,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&json)
}

/// Print an operation failure with guidance for the user
pub fn print_error(err: &FimError, target: &Path) {
    match err {
        FimError::InvalidTarget(path) => {
            eprintln!(
                "{} Directory not found: {}",
                Theme::error("[!] Error:"),
                path.display()
            );
        }
        FimError::Store(StoreError::NotFound { path }) => {
            eprintln!(
                "{} Baseline file '{}' not found.",
                Theme::error("[!] Error:"),
                path.display()
            );
            eprintln!(
                "{} Please run {} first.",
                Theme::warning("[*]"),
                Theme::command(&format!("fim init {}", target.display()))
            );
        }
        FimError::Store(StoreError::Corrupt { path, reason }) => {
            eprintln!(
                "{} Baseline file '{}' is corrupt: {}",
                Theme::error("[!] Error:"),
                path.display(),
                reason
            );
            eprintln!(
                "{} Re-create it with {} once the tree is known to be good.",
                Theme::warning("[*]"),
                Theme::command(&format!("fim init {}", target.display()))
            );
        }
        FimError::Store(StoreError::Write { .. }) => {
            eprintln!("{}", Theme::error("[FATAL ERROR] Could not write baseline file!"));
            eprintln!("{} Reason: {}", Theme::error("[*]"), err);
        }
        other => {
            eprintln!("{} {}", Theme::error("[!] Error:"), other);
        }
    }
}
