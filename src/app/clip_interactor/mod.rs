// Clip interactor - Orchestrates the clip request use case

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::app::artifacts::ArtifactSet;
use crate::config::AppConfig;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::error::{ClipError, ClipResult};
use crate::ports::*;
use crate::utils::format_file_size;
use crate::utils::path::ArtifactPaths;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

/// External collaborators of the interactor
#[derive(Clone)]
pub struct ClipPorts {
    pub retrieve: Arc<dyn RetrievePort>,
    pub transcode: Arc<dyn TranscodePort>,
    pub watch: Arc<dyn WatchPort>,
    pub cleanup: Arc<dyn CleanupPort>,
    pub observer: Arc<dyn ProgressObserver>,
}

/// Behavioural settings, resolved once from configuration
#[derive(Debug, Clone)]
pub struct ClipSettings {
    pub temp_dir: PathBuf,
    pub max_clip_seconds: u64,
    pub formats: QualityFormats,
    pub server_side_sections: bool,
    pub trim_strategy: TrimStrategy,
    pub max_concurrent_jobs: usize,
}

impl ClipSettings {
    pub fn from_config(config: &AppConfig) -> ClipResult<Self> {
        Ok(Self {
            temp_dir: config.temp_dir.clone(),
            max_clip_seconds: config.max_clip_seconds,
            formats: QualityFormats::with_overrides(&config.ytdlp.quality_formats)?,
            server_side_sections: config.ytdlp.server_side_sections,
            trim_strategy: config.trim_strategy,
            max_concurrent_jobs: config.max_concurrent_jobs.max(1),
        })
    }

    /// Default settings rooted at `temp_dir`
    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        let config = AppConfig::default();
        Self {
            temp_dir: temp_dir.into(),
            max_clip_seconds: config.max_clip_seconds,
            formats: QualityFormats::default(),
            server_side_sections: config.ytdlp.server_side_sections,
            trim_strategy: config.trim_strategy,
            max_concurrent_jobs: config.max_concurrent_jobs.max(1),
        }
    }
}

/// A finished clip ready to be sent.
///
/// The file at `path` lives as long as `artifacts`; dropping it deletes
/// every file the request created.
#[derive(Debug)]
pub struct ClipOutput {
    pub path: PathBuf,
    pub size: u64,
    pub artifacts: ArtifactSet,
}

/// Interactor for the clip use case
pub struct ClipInteractor {
    ports: ClipPorts,
    settings: ClipSettings,
    permits: Semaphore,
}

impl ClipInteractor {
    /// Create new clip interactor with injected ports
    pub fn new(ports: ClipPorts, settings: ClipSettings) -> Self {
        let permits = Semaphore::new(settings.max_concurrent_jobs.max(1));
        Self {
            ports,
            settings,
            permits,
        }
    }

    pub fn settings(&self) -> &ClipSettings {
        &self.settings
    }

    /// Validate raw parameters into a request without touching any tool
    pub fn validate(&self, params: &ClipParams) -> ClipResult<ClipRequest> {
        ClipRequest::from_params(params, self.settings.max_clip_seconds)
    }

    /// Validate and execute a clip request inside its own log span
    pub async fn clip(&self, params: &ClipParams) -> ClipResult<ClipOutput> {
        let request_id = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
        let span = info_span!("clip", request_id);

        async {
            transition(ClipState::Validating);
            let request = match self.validate(params) {
                Ok(request) => request,
                Err(e) => {
                    info!("Rejected clip request: {}", e);
                    transition(ClipState::Error(e.kind()));
                    transition(ClipState::Done);
                    return Err(e);
                }
            };
            self.execute(&request).await
        }
        .instrument(span)
        .await
    }

    /// Run retrieval, trimming and completion checks for a validated request.
    ///
    /// On failure every artifact is removed before the error is returned.
    pub async fn execute(&self, request: &ClipRequest) -> ClipResult<ClipOutput> {
        let range = request.range();
        info!(
            "Processing video: {} ({} to {}, {}s at {})",
            request.url(),
            request.start(),
            request.end(),
            range.duration(),
            request.quality()
        );

        // The semaphore is owned by `self` and never closed
        let _permit = self.permits.acquire().await.ok();

        let artifacts = ArtifactSet::new(
            ArtifactPaths::generate(&self.settings.temp_dir),
            Arc::clone(&self.ports.cleanup),
        );

        match self.run_pipeline(request, artifacts.paths()).await {
            Ok((path, size)) => {
                info!("Clip ready: {} ({})", path.display(), format_file_size(size));
                transition(ClipState::Responding);
                Ok(ClipOutput {
                    path,
                    size,
                    artifacts,
                })
            }
            Err(e) => {
                warn!("Error processing video: {}", e);
                transition(ClipState::Error(e.kind()));
                artifacts.release();
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        request: &ClipRequest,
        paths: &ArtifactPaths,
    ) -> ClipResult<(PathBuf, u64)> {
        let range = request.range();
        let sections = self.settings.server_side_sections;
        let observer = self.ports.observer.as_ref();

        transition(ClipState::Retrieving);
        let retrieval = RetrievalJob {
            source_url: request.url().to_string(),
            format_selector: self.settings.formats.selector(request.quality()),
            output_path: paths.source.clone(),
            section: sections.then_some(range),
        };
        self.ports.retrieve.retrieve(&retrieval, observer).await?;

        transition(ClipState::WaitingStable(ArtifactKind::Source));
        let source_size = self.ports.watch.wait_until_stable(&paths.source).await?;
        debug!("Retrieved {}", format_file_size(source_size));

        transition(ClipState::Trimming);
        let trim_output = match self.settings.trim_strategy {
            TrimStrategy::Separate => paths.trimmed.clone(),
            TrimStrategy::InPlace => paths.staging.clone(),
        };
        let transcode = TranscodeJob {
            input_path: paths.source.clone(),
            output_path: trim_output.clone(),
            start_seconds: transcode_seek(range, sections),
            duration_seconds: range.duration(),
        };
        self.ports.transcode.transcode(&transcode, observer).await?;

        let clip_path = match self.settings.trim_strategy {
            TrimStrategy::Separate => trim_output,
            TrimStrategy::InPlace => {
                tokio::fs::rename(&trim_output, &paths.source)
                    .await
                    .map_err(|e| ClipError::TranscodeFailed {
                        message: format!(
                            "Failed to replace {} with trimmed output: {}",
                            paths.source.display(),
                            e
                        ),
                    })?;
                paths.source.clone()
            }
        };

        transition(ClipState::WaitingStable(ArtifactKind::Trimmed));
        let size = self.ports.watch.wait_until_stable(&clip_path).await?;
        Ok((clip_path, size))
    }
}

fn transition(state: ClipState) {
    debug!(state = %state, "Clip state changed");
}
