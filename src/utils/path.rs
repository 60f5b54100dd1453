//! Per-request artifact paths

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use walkdir::WalkDir;

/// File name prefixes of every artifact a request can create
pub const ARTIFACT_PREFIXES: [&str; 3] = ["source_", "trimmed_", "staging_"];

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Paths of the files a single clip request may create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Where the retrieval tool writes the full media
    pub source: PathBuf,
    /// Where the separate trim strategy writes the clip
    pub trimmed: PathBuf,
    /// Scratch output of the in-place trim strategy before it replaces `source`
    pub staging: PathBuf,
}

impl ArtifactPaths {
    /// Fresh paths under `temp_dir`, unique within this process.
    ///
    /// Names combine the wall clock in milliseconds with a process-wide
    /// counter so two requests in the same millisecond never collide.
    pub fn generate(temp_dir: &Path) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let tag = format!("{}_{}", millis, seq);

        Self {
            source: temp_dir.join(format!("source_{}.mp4", tag)),
            trimmed: temp_dir.join(format!("trimmed_{}.mp4", tag)),
            staging: temp_dir.join(format!("staging_{}.mp4", tag)),
        }
    }

    /// Partial-download sidecars the retrieval tool may leave next to `source`
    pub fn sidecars(&self) -> [PathBuf; 2] {
        [
            append_extension(&self.source, "part"),
            append_extension(&self.source, "ytdl"),
        ]
    }

    /// Files currently on disk whose names extend the source stem.
    ///
    /// Merged formats make the retrieval tool write per-format downloads
    /// and fragments next to `source` (`source_<tag>.f137.mp4.part`,
    /// `source_<tag>.f140.m4a`, `source_<tag>.f137.mp4.part-Frag3`).
    pub fn retrieval_leftovers(&self) -> Vec<PathBuf> {
        let (Some(dir), Some(stem)) = (
            self.source.parent(),
            self.source.file_stem().and_then(|s| s.to_str()),
        ) else {
            return Vec::new();
        };
        let prefix = format!("{}.", stem);

        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| !entry.file_type().is_dir())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with(&prefix))
            })
            .map(|entry| entry.into_path())
            .collect()
    }

    /// Every path to remove once the request is over, including leftovers
    /// found on disk at the time of the call
    pub fn all(&self) -> Vec<PathBuf> {
        let [part, ytdl] = self.sidecars();
        let mut paths = vec![
            self.source.clone(),
            part,
            ytdl,
            self.trimmed.clone(),
            self.staging.clone(),
        ];
        for leftover in self.retrieval_leftovers() {
            if !paths.contains(&leftover) {
                paths.push(leftover);
            }
        }
        paths
    }
}

/// `clip.mp4` + `part` -> `clip.mp4.part`
pub fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Whether a file name looks like a request artifact
pub fn is_artifact_name(name: &str) -> bool {
    ARTIFACT_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}
