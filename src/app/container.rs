use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::{
    FFmpegAdapter, FsCleanupAdapter, PollingWatcher, TracingProgressObserver, YtdlpAdapter,
};
use crate::app::clip_interactor::{ClipInteractor, ClipPorts, ClipSettings};
use crate::config::AppConfig;
use crate::error::ClipResult;
use crate::ports::{RetrievePort, ToolInfoPort, TranscodePort};

pub trait AppContainer: Send + Sync {
    fn clip_interactor(&self) -> Arc<ClipInteractor>;
    fn tool_info(&self) -> Arc<dyn ToolInfoPort>;
}

/// Version lines of the external tools, or why they are unusable
#[derive(Debug)]
pub struct ToolReport {
    pub ytdlp: ClipResult<String>,
    pub ffmpeg: ClipResult<String>,
}

impl ToolReport {
    pub fn all_ok(&self) -> bool {
        self.ytdlp.is_ok() && self.ffmpeg.is_ok()
    }
}

/// Container wiring the real tool adapters
pub struct DefaultAppContainer {
    clip_interactor: Arc<ClipInteractor>,
    ytdlp: Arc<YtdlpAdapter>,
    ffmpeg: Arc<FFmpegAdapter>,
}

impl DefaultAppContainer {
    pub fn from_config(config: &AppConfig) -> ClipResult<Self> {
        let ytdlp = Arc::new(YtdlpAdapter::from_config(config));
        let ffmpeg = Arc::new(FFmpegAdapter::new(&config.ffmpeg));
        info!(
            "Using yt-dlp at {} and ffmpeg at {}",
            ytdlp.program().display(),
            ffmpeg.program().display()
        );

        let ports = ClipPorts {
            retrieve: Arc::clone(&ytdlp) as Arc<dyn RetrievePort>,
            transcode: Arc::clone(&ffmpeg) as Arc<dyn TranscodePort>,
            watch: Arc::new(PollingWatcher::from_config(&config.watch)),
            cleanup: Arc::new(FsCleanupAdapter::new()),
            observer: Arc::new(TracingProgressObserver),
        };
        let clip_interactor = Arc::new(ClipInteractor::new(
            ports,
            ClipSettings::from_config(config)?,
        ));

        Ok(Self {
            clip_interactor,
            ytdlp,
            ffmpeg,
        })
    }

    /// Run both tools' version commands
    pub async fn verify_tools(&self) -> ToolReport {
        let (ytdlp, ffmpeg) = tokio::join!(self.ytdlp.version(), self.ffmpeg.version());
        match &ytdlp {
            Ok(version) => info!("yt-dlp version: {}", version),
            Err(e) => warn!("{}", e),
        }
        match &ffmpeg {
            Ok(version) => info!("ffmpeg version: {}", version),
            Err(e) => warn!("{}", e),
        }
        ToolReport { ytdlp, ffmpeg }
    }
}

impl AppContainer for DefaultAppContainer {
    fn clip_interactor(&self) -> Arc<ClipInteractor> {
        Arc::clone(&self.clip_interactor)
    }

    fn tool_info(&self) -> Arc<dyn ToolInfoPort> {
        Arc::clone(&self.ytdlp) as Arc<dyn ToolInfoPort>
    }
}
