// Filesystem cleanup adapter - Artifact removal and stale temp sweeping

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::ports::CleanupPort;
use crate::utils::path::is_artifact_name;

/// Artifacts older than this are considered leftovers of a crashed process
pub const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// Removes request artifacts from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsCleanupAdapter;

impl FsCleanupAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl CleanupPort for FsCleanupAdapter {
    fn cleanup(&self, paths: &[PathBuf]) {
        for path in paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Nothing to remove at {}", path.display())
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

/// Delete request artifacts in `dir` last modified more than `max_age` ago.
///
/// Only direct children whose names carry an artifact prefix are touched.
/// Returns the number of files removed.
pub fn sweep_stale(dir: &Path, max_age: Duration) -> usize {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to scan {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let is_artifact = entry.file_name().to_str().is_some_and(is_artifact_name);
        if !is_artifact {
            continue;
        }

        let age = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|modified| now.duration_since(modified).ok());
        if !age.is_some_and(|age| age > max_age) {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                debug!("Removed stale artifact {}", entry.path().display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove {}: {}", entry.path().display(), e),
        }
    }

    if removed > 0 {
        info!("Removed {} stale artifacts from {}", removed, dir.display());
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;

    #[test]
    fn test_cleanup_removes_existing_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("source_1_0.mp4");
        let b = dir.path().join("trimmed_1_0.mp4");
        let missing = dir.path().join("source_1_0.mp4.part");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        FsCleanupAdapter::new().cleanup(&[a.clone(), missing, b.clone()]);

        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_cleanup_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be removed with remove_file
        let blocker = dir.path().join("trimmed_2_0.mp4");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("inner"), b"x").unwrap();
        let after = dir.path().join("source_2_0.mp4");
        std::fs::write(&after, b"a").unwrap();

        FsCleanupAdapter::new().cleanup(&[blocker.clone(), after.clone()]);

        assert!(blocker.exists());
        assert!(!after.exists());
    }

    #[test]
    fn test_sweep_stale_only_old_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let old_source = dir.path().join("source_1_0.mp4");
        let old_part = dir.path().join("source_1_0.mp4.part");
        let fresh = dir.path().join("trimmed_9_9.mp4");
        let unrelated = dir.path().join("notes.txt");
        for path in [&old_source, &old_part, &fresh, &unrelated] {
            std::fs::write(path, b"data").unwrap();
        }

        let two_hours_ago = FileTime::from_system_time(
            SystemTime::now() - Duration::from_secs(2 * 60 * 60),
        );
        for path in [&old_source, &old_part, &unrelated] {
            filetime::set_file_mtime(path, two_hours_ago).unwrap();
        }

        let removed = sweep_stale(dir.path(), STALE_AFTER);

        assert_eq!(removed, 2);
        assert!(!old_source.exists());
        assert!(!old_part.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_sweep_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(sweep_stale(&dir.path().join("absent"), STALE_AFTER), 0);
    }
}
