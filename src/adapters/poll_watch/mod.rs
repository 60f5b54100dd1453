//! Polling completion watcher
//!
//! The external tools give no explicit "done" signal for the files they
//! write, so completion is inferred: a file is stable once it exists, is
//! non-empty, and two consecutive polls report the same size.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::config::WatchConfig;
use crate::error::{ClipError, ClipResult};
use crate::ports::WatchPort;

/// Source of file size observations
#[async_trait]
pub trait SizeProbe: Send + Sync {
    /// Current size of the file, `None` if it does not exist yet
    async fn size(&self, path: &Path) -> std::io::Result<Option<u64>>;
}

/// Size probe backed by filesystem metadata
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSizeProbe;

#[async_trait]
impl SizeProbe for FsSizeProbe {
    async fn size(&self, path: &Path) -> std::io::Result<Option<u64>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(Some(metadata.len())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<T: SizeProbe + ?Sized> SizeProbe for std::sync::Arc<T> {
    async fn size(&self, path: &Path) -> std::io::Result<Option<u64>> {
        (**self).size(path).await
    }
}

/// Watcher polling a path at a fixed interval until stable or timed out
#[derive(Debug, Clone)]
pub struct PollingWatcher<P = FsSizeProbe> {
    probe: P,
    interval: Duration,
    timeout: Duration,
}

impl PollingWatcher<FsSizeProbe> {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self::with_probe(FsSizeProbe, interval, timeout)
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(
            Duration::from_millis(config.interval_ms),
            Duration::from_millis(config.timeout_ms),
        )
    }
}

impl<P: SizeProbe> PollingWatcher<P> {
    pub fn with_probe(probe: P, interval: Duration, timeout: Duration) -> Self {
        Self {
            probe,
            interval,
            timeout,
        }
    }
}

#[async_trait]
impl<P: SizeProbe> WatchPort for PollingWatcher<P> {
    async fn wait_until_stable(&self, path: &Path) -> ClipResult<u64> {
        let deadline = Instant::now() + self.timeout;
        let mut previous: Option<u64> = None;

        loop {
            let current = self
                .probe
                .size(path)
                .await
                .map_err(|source| ClipError::WatchFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            trace!("{} size: {:?}", path.display(), current);

            if let (Some(size), Some(prev)) = (current, previous) {
                if size == prev {
                    debug!("{} is stable at {} bytes", path.display(), size);
                    return Ok(size);
                }
            }
            previous = current.filter(|size| *size > 0);

            if Instant::now() >= deadline {
                return Err(ClipError::WatchTimeout {
                    path: path.to_path_buf(),
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
            sleep(self.interval).await;
        }
    }
}
