//! yt-dlp retrieval adapter
//!
//! Builds the retrieval argument contract and runs the downloader as a child
//! process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::command::{tool_version, ToolCommand};
use crate::config::{AppConfig, YtdlpConfig};
use crate::domain::model::*;
use crate::error::{ClipError, ClipResult};
use crate::ports::*;

pub const YT_DLP: &str = "yt-dlp";

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
#[derive(Debug, Clone)]
pub struct YtdlpAdapter {
    program: PathBuf,
    settings: YtdlpConfig,
}

impl YtdlpAdapter {
    pub fn new(program: impl Into<PathBuf>, settings: YtdlpConfig) -> Self {
        Self {
            program: program.into(),
            settings,
        }
    }

    /// Adapter using the binary selected by the configured environment
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ytdlp_program(), config.ytdlp.clone())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the full command for one retrieval job
    pub fn build_command(&self, job: &RetrievalJob) -> ToolCommand {
        let settings = &self.settings;
        let mut cmd = ToolCommand::new(&self.program)
            .args(["-f", job.format_selector.as_str()])
            .args(["--merge-output-format", "mp4"])
            .args(["--retries", &settings.retries.to_string()])
            .args(["--fragment-retries", &settings.fragment_retries.to_string()])
            .args([
                "--file-access-retries",
                &settings.file_access_retries.to_string(),
            ])
            .args(["--max-filesize", settings.max_filesize.as_str()])
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--no-check-certificate")
            .arg("--force-overwrites")
            .arg("--newline");

        if let Some(extractor_args) = settings.extractor_args.as_deref() {
            cmd = cmd.args(["--extractor-args", extractor_args]);
        }

        if let Some(section) = job.section {
            cmd = cmd
                .args([
                    "--download-sections".to_string(),
                    format!("*{}-{}", section.start, section.end),
                ])
                .arg("--force-keyframes-at-cuts");
        }

        cmd.arg("-o")
            .arg(job.output_path.as_os_str())
            .arg("--")
            .arg(&job.source_url)
    }
}

/// Extract the percentage from a `[download]  42.5% of ...` progress line
pub fn parse_progress_line(line: &str) -> Option<f64> {
    let rest = line.trim_start().strip_prefix("[download]")?;
    let token = rest.split_whitespace().next()?;
    token.strip_suffix('%')?.parse().ok()
}

#[async_trait]
impl RetrievePort for YtdlpAdapter {
    async fn retrieve(
        &self,
        job: &RetrievalJob,
        observer: &dyn ProgressObserver,
    ) -> ClipResult<()> {
        let cmd = self.build_command(job);
        observer.on_start(YT_DLP, &cmd.command_line());

        let mut last_reported = -1.0_f64;
        let exit = cmd
            .run(|line| {
                if let Some(percent) = parse_progress_line(line) {
                    if percent.floor() > last_reported {
                        last_reported = percent.floor();
                        observer.on_progress(YT_DLP, percent);
                    }
                }
            })
            .await
            .map_err(|e| ClipError::RetrievalFailed {
                message: format!("Could not run {}: {}", self.program.display(), e),
            })?;

        if exit.success() {
            debug!("Retrieval finished: {}", job.output_path.display());
            Ok(())
        } else {
            let message = exit.describe_failure(YT_DLP);
            warn!("{}", message);
            Err(ClipError::RetrievalFailed { message })
        }
    }
}

#[async_trait]
impl ToolInfoPort for YtdlpAdapter {
    async fn version(&self) -> ClipResult<String> {
        tool_version(&self.program, "--version")
            .await
            .map_err(|e| ClipError::RetrievalFailed {
                message: format!("{} is not usable: {}", self.program.display(), e),
            })
    }
}
