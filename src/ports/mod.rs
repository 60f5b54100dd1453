// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::model::*;
use crate::error::ClipResult;

/// Port for fetching remote media to a local path
#[async_trait]
pub trait RetrievePort: Send + Sync {
    /// Run the retrieval tool for one job and wait for it to exit.
    ///
    /// A non-zero exit or a spawn failure yields `RetrievalFailed`.
    async fn retrieve(&self, job: &RetrievalJob, observer: &dyn ProgressObserver)
        -> ClipResult<()>;
}

/// Port for cutting a sub-range out of a local media file
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Run the transcode tool for one job and wait for it to exit.
    ///
    /// A non-zero exit or a spawn failure yields `TranscodeFailed`.
    async fn transcode(&self, job: &TranscodeJob, observer: &dyn ProgressObserver)
        -> ClipResult<()>;
}

/// Port for detecting that an externally written file is complete
#[async_trait]
pub trait WatchPort: Send + Sync {
    /// Wait until the file exists, is non-empty and has stopped growing.
    /// Returns the stable size in bytes.
    async fn wait_until_stable(&self, path: &Path) -> ClipResult<u64>;
}

/// Port for removing request artifacts
pub trait CleanupPort: Send + Sync {
    /// Best-effort removal of every path. Never fails and never stops early.
    fn cleanup(&self, paths: &[PathBuf]);
}

/// Port for reporting the installed external tool version
#[async_trait]
pub trait ToolInfoPort: Send + Sync {
    async fn version(&self) -> ClipResult<String>;
}

/// Optional observer for external tool activity.
///
/// Events are informational only; they never affect the outcome of a job.
pub trait ProgressObserver: Send + Sync {
    /// Called once the tool process has been spawned
    fn on_start(&self, tool: &str, command_line: &str);

    /// Called when the tool reports a new whole percentage
    fn on_progress(&self, tool: &str, percent: f64);
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_start(&self, _tool: &str, _command_line: &str) {}

    fn on_progress(&self, _tool: &str, _percent: f64) {}
}
