//! FFmpeg transcode adapter
//!
//! Cuts `[start, start + duration)` out of a local file by running the
//! `ffmpeg` binary.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::command::{tool_version, ToolCommand};
use crate::config::FfmpegConfig;
use crate::domain::model::*;
use crate::error::{ClipError, ClipResult};
use crate::ports::*;

pub const FFMPEG: &str = "ffmpeg";

/// FFmpeg-based transcode adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    program: PathBuf,
    stream_copy: bool,
}

impl FFmpegAdapter {
    pub fn new(settings: &FfmpegConfig) -> Self {
        Self {
            program: settings.path.clone(),
            stream_copy: settings.stream_copy,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the full command for one transcode job
    pub fn build_command(&self, job: &TranscodeJob) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.program)
            .arg("-hide_banner")
            .args(["-loglevel", "error"])
            .arg("-nostdin")
            .arg("-y")
            .args(["-ss".to_string(), job.start_seconds.to_string()])
            .arg("-i")
            .arg(job.input_path.as_os_str())
            .args(["-t".to_string(), job.duration_seconds.to_string()]);

        if self.stream_copy {
            cmd = cmd.args(["-c", "copy", "-avoid_negative_ts", "make_zero"]);
        }

        cmd.args(["-movflags", "+faststart"])
            .args(["-progress", "pipe:1", "-nostats"])
            .args(["-f", "mp4"])
            .arg(job.output_path.as_os_str())
    }

    /// Verify that the binary is reachable and return its version line
    pub async fn version(&self) -> ClipResult<String> {
        tool_version(&self.program, "-version")
            .await
            .map_err(|e| ClipError::TranscodeFailed {
                message: format!("{} is not usable: {}", self.program.display(), e),
            })
    }
}

/// Percentage of the job done according to a `-progress` key/value line
pub fn parse_progress_line(line: &str, duration_seconds: u64) -> Option<f64> {
    if duration_seconds == 0 {
        return None;
    }
    let (key, value) = line.trim().split_once('=')?;
    // ffmpeg reports microseconds under both keys
    if key != "out_time_us" && key != "out_time_ms" {
        return None;
    }
    let micros: f64 = value.trim().parse().ok()?;
    let percent = micros / (duration_seconds as f64 * 1_000_000.0) * 100.0;
    Some(percent.clamp(0.0, 100.0))
}

#[async_trait]
impl TranscodePort for FFmpegAdapter {
    async fn transcode(
        &self,
        job: &TranscodeJob,
        observer: &dyn ProgressObserver,
    ) -> ClipResult<()> {
        let cmd = self.build_command(job);
        observer.on_start(FFMPEG, &cmd.command_line());

        let mut last_reported = -1.0_f64;
        let exit = cmd
            .run(|line| {
                if let Some(percent) = parse_progress_line(line, job.duration_seconds) {
                    if percent.floor() > last_reported {
                        last_reported = percent.floor();
                        observer.on_progress(FFMPEG, percent);
                    }
                }
            })
            .await
            .map_err(|e| ClipError::TranscodeFailed {
                message: format!("Could not run {}: {}", self.program.display(), e),
            })?;

        if exit.success() {
            debug!("Trimming complete: {}", job.output_path.display());
            Ok(())
        } else {
            let message = exit.describe_failure(FFMPEG);
            warn!("{}", message);
            Err(ClipError::TranscodeFailed { message })
        }
    }
}
