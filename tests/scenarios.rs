//! End-to-end initialize/check scenarios against real directories

use fim::{Config, FimError, Monitor, StoreError};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn monitor() -> Monitor {
    Monitor::from_config(&Config::default())
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// a.txt = "hello", b.txt = "world", baseline recorded
fn initialized_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
    fs::write(temp_dir.path().join("b.txt"), "world").unwrap();
    let summary = monitor().initialize(temp_dir.path(), |_| {}).unwrap();
    assert_eq!(summary.files, 2);
    temp_dir
}

fn check(root: &Path) -> fim::CheckSummary {
    monitor().check(root, |_| {}).unwrap()
}

#[test]
fn test_check_right_after_init_is_clean() {
    let dir = initialized_dir();
    let summary = check(dir.path());
    assert!(summary.report.is_clean());
    assert_eq!(summary.report.unchanged, 2);
}

#[test]
fn test_modified_file_detected() {
    let dir = initialized_dir();
    fs::write(dir.path().join("a.txt"), "hello!").unwrap();

    let report = check(dir.path()).report;
    assert_eq!(report.modified, set(&["a.txt"]));
    assert!(report.added.is_empty());
    assert!(report.deleted.is_empty());
}

#[test]
fn test_deleted_file_detected() {
    let dir = initialized_dir();
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let report = check(dir.path()).report;
    assert_eq!(report.deleted, set(&["b.txt"]));
    assert!(report.added.is_empty());
    assert!(report.modified.is_empty());
}

#[test]
fn test_added_file_detected() {
    let dir = initialized_dir();
    fs::write(dir.path().join("c.txt"), "new").unwrap();

    let report = check(dir.path()).report;
    assert_eq!(report.added, set(&["c.txt"]));
    assert!(report.deleted.is_empty());
    assert!(report.modified.is_empty());
}

#[test]
fn test_check_before_init_reports_not_found() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

    match monitor().check(temp_dir.path(), |_| {}) {
        Err(FimError::Store(StoreError::NotFound { path })) => {
            assert_eq!(path, temp_dir.path().join(".baseline"));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_corrupt_baseline_distinct_from_missing() {
    let dir = initialized_dir();
    fs::write(dir.path().join(".baseline"), "garbage").unwrap();

    assert!(matches!(
        monitor().check(dir.path(), |_| {}),
        Err(FimError::Store(StoreError::Corrupt { .. }))
    ));
}

#[test]
fn test_nested_changes_and_baseline_never_reported() {
    let temp_dir = TempDir::new().unwrap();
    let sub = temp_dir.path().join("etc").join("conf.d");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("app.conf"), "port=80").unwrap();
    monitor().initialize(temp_dir.path(), |_| {}).unwrap();

    // a stray baseline-named file deep in the tree is ignored
    fs::write(sub.join(".baseline"), "{}").unwrap();
    fs::write(sub.join("app.conf"), "port=8080").unwrap();

    let report = check(temp_dir.path()).report;
    assert_eq!(report.modified, set(&["etc/conf.d/app.conf"]));
    assert!(report.added.is_empty());
}

#[test]
fn test_baselines_portable_across_root_spellings() {
    let dir = initialized_dir();
    let summary = check(&dir.path().join("."));
    assert!(summary.report.is_clean());
}

#[test]
fn test_reinit_accepts_current_state() {
    let dir = initialized_dir();
    fs::write(dir.path().join("a.txt"), "changed").unwrap();
    assert!(!check(dir.path()).report.is_clean());

    monitor().initialize(dir.path(), |_| {}).unwrap();
    assert!(check(dir.path()).report.is_clean());
}

#[test]
fn test_blake3_configuration_end_to_end() {
    let config = Config {
        algorithm: fim::HashAlgorithm::Blake3,
        baseline_name: "fim.json".to_string(),
        ..Config::default()
    };
    let monitor = Monitor::from_config(&config);

    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
    monitor.initialize(temp_dir.path(), |_| {}).unwrap();
    assert!(temp_dir.path().join("fim.json").exists());

    fs::write(temp_dir.path().join("a.txt"), "hello!").unwrap();
    let report = monitor.check(temp_dir.path(), |_| {}).unwrap().report;
    assert_eq!(report.modified, set(&["a.txt"]));
}

#[test]
fn test_existing_temp_named_file_survives_init() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
    let user_file = temp_dir.path().join(".baseline.tmp");
    fs::write(&user_file, "user data").unwrap();

    let summary = monitor().initialize(temp_dir.path(), |_| {}).unwrap();
    assert_eq!(summary.files, 2);

    assert!(check(temp_dir.path()).report.is_clean());
    assert_eq!(fs::read_to_string(&user_file).unwrap(), "user data");
}

#[cfg(unix)]
mod links {
    use super::*;
    use fim::scan_events::ScanEvent;
    use fim::HashErrorKind;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_dangling_link_skipped_then_reported_as_added() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
        let target = temp_dir.path().join("target.txt");
        symlink(&target, temp_dir.path().join("link.txt")).unwrap();

        let mut warned = Vec::new();
        let summary = monitor()
            .initialize(temp_dir.path(), |event| {
                if let ScanEvent::Skipped { path, error } = event {
                    warned.push((path.clone(), error.kind));
                }
            })
            .unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(warned, vec![("link.txt".to_string(), HashErrorKind::Vanished)]);

        let baseline = fs::read_to_string(temp_dir.path().join(".baseline")).unwrap();
        assert!(!baseline.contains("link.txt"));

        fs::write(&target, "now here").unwrap();
        let report = check(temp_dir.path()).report;
        assert_eq!(report.added, set(&["link.txt", "target.txt"]));
        assert!(report.modified.is_empty());
        assert!(report.deleted.is_empty());
    }

    #[test]
    fn test_file_replaced_by_dangling_link_reported_deleted_and_skipped() {
        let dir = initialized_dir();
        let file = dir.path().join("a.txt");
        fs::remove_file(&file).unwrap();
        symlink(dir.path().join("gone.txt"), &file).unwrap();

        let summary = check(dir.path());
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].path, "a.txt");
        assert_eq!(summary.report.deleted, set(&["a.txt"]));
        assert!(summary.report.modified.is_empty());
    }

    #[test]
    fn test_link_loop_counted_when_following_links() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("b.txt"), "b").unwrap();
        symlink(temp_dir.path(), sub.join("back")).unwrap();

        let config = Config {
            follow_links: true,
            ..Config::default()
        };
        let summary = Monitor::from_config(&config)
            .initialize(temp_dir.path(), |_| {})
            .unwrap();
        assert_eq!(summary.files, 1);
        assert!(summary.unreadable_entries >= 1);
    }
}

#[cfg(unix)]
mod permissions {
    use super::*;
    use fim::scan_events::ScanEvent;
    use std::os::unix::fs::PermissionsExt;

    fn lock(path: &Path) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    }

    fn unlock(path: &Path) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_unreadable_file_skipped_then_reported_as_added() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
        let secret = temp_dir.path().join("secret.txt");
        fs::write(&secret, "classified").unwrap();
        lock(&secret);
        if fs::read(&secret).is_ok() {
            // running as root, permissions are not enforced
            return;
        }

        let mut warned = Vec::new();
        let summary = monitor()
            .initialize(temp_dir.path(), |event| {
                if let ScanEvent::Skipped { path, .. } = event {
                    warned.push(path.clone());
                }
            })
            .unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(warned, vec!["secret.txt".to_string()]);

        let baseline = fs::read_to_string(temp_dir.path().join(".baseline")).unwrap();
        assert!(!baseline.contains("secret.txt"));

        unlock(&secret);
        let report = check(temp_dir.path()).report;
        assert_eq!(report.added, set(&["secret.txt"]));
        assert!(report.modified.is_empty());
    }

    /// A file that becomes unreadable after baselining is missing from the
    /// current snapshot, so it shows up as deleted and as a skipped file.
    /// Its content is never compared, so it is never reported as modified.
    #[test]
    fn test_file_unreadable_after_init_reported_deleted_and_skipped() {
        let dir = initialized_dir();
        let target = dir.path().join("a.txt");
        lock(&target);
        if fs::read(&target).is_ok() {
            return;
        }

        let summary = check(dir.path());
        unlock(&target);

        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.report.deleted.contains("a.txt"));
        assert!(summary.report.modified.is_empty());
    }

    #[test]
    fn test_unwritable_root_fails_init() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ro");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), "hello").unwrap();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o555)).unwrap();
        if fs::write(root.join("write_check"), "x").is_ok() {
            return;
        }

        let result = monitor().initialize(&root, |_| {});
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(result, Err(FimError::Store(StoreError::Write { .. }))));
    }
}
