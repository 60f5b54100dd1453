//! Ownership of the temporary files created by one clip request

use std::fmt;
use std::sync::Arc;

use tracing::{debug, Span};

use crate::domain::model::ClipState;
use crate::ports::CleanupPort;
use crate::utils::path::ArtifactPaths;

/// Guard over a request's artifacts.
///
/// Cleanup runs exactly once: on [`ArtifactSet::release`] or when the guard
/// is dropped, whichever happens first. Dropping covers client aborts and
/// the end of a streamed response body.
pub struct ArtifactSet {
    paths: ArtifactPaths,
    cleanup: Arc<dyn CleanupPort>,
    span: Span,
    released: bool,
}

impl ArtifactSet {
    /// Take ownership of `paths`, logging cleanup in the current span
    pub fn new(paths: ArtifactPaths, cleanup: Arc<dyn CleanupPort>) -> Self {
        Self {
            paths,
            cleanup,
            span: Span::current(),
            released: false,
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Remove every artifact now
    pub fn release(mut self) {
        self.run_cleanup();
    }

    fn run_cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let _entered = self.span.enter();
        debug!(state = %ClipState::CleaningUp, "Clip state changed");
        self.cleanup.cleanup(&self.paths.all());
        debug!(state = %ClipState::Done, "Clip state changed");
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        self.run_cleanup();
    }
}

impl fmt::Debug for ArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactSet")
            .field("paths", &self.paths)
            .field("released", &self.released)
            .finish()
    }
}
