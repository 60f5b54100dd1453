//! Application configuration
//!
//! Every field has a default so a partial TOML file (or none at all) is
//! valid. Loading and layering is done by the `toml_config` adapter.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::model::TrimStrategy;
use crate::domain::rules::QualityFormats;
use crate::error::{ClipError, ClipResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Deployment environment, selects the retrieval binary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl FromStr for Environment {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(ClipError::config(format!(
                "Unknown environment '{}', expected production or development",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ClipError::config(format!(
                "Unknown log format '{}', expected pretty or json",
                other
            ))),
        }
    }
}

/// Retrieval tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YtdlpConfig {
    /// Explicit binary, wins over the environment-specific paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub production_path: PathBuf,
    pub development_path: PathBuf,
    pub retries: u32,
    pub fragment_retries: u32,
    pub file_access_retries: u32,
    pub max_filesize: String,
    /// Let the downloader fetch only the requested section
    pub server_side_sections: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractor_args: Option<String>,
    /// Format selector overrides keyed by quality label (`"720p"`)
    pub quality_formats: BTreeMap<String, String>,
}

impl Default for YtdlpConfig {
    fn default() -> Self {
        Self {
            path: None,
            production_path: PathBuf::from("/usr/local/bin/yt-dlp"),
            development_path: PathBuf::from("yt-dlp"),
            retries: 10,
            fragment_retries: 10,
            file_access_retries: 5,
            max_filesize: "500M".to_string(),
            server_side_sections: false,
            extractor_args: Some("youtube:player_client=android".to_string()),
            quality_formats: BTreeMap::new(),
        }
    }
}

/// Transcode tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    pub path: PathBuf,
    /// Cut without re-encoding (fast, keyframe-aligned)
    pub stream_copy: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ffmpeg"),
            stream_copy: false,
        }
    }
}

/// Completion watcher timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            timeout_ms: 60_000,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    pub temp_dir: PathBuf,
    pub max_clip_seconds: u64,
    pub trim_strategy: TrimStrategy,
    pub max_concurrent_jobs: usize,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub ytdlp: YtdlpConfig,
    pub ffmpeg: FfmpegConfig,
    pub watch: WatchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            environment: Environment::default(),
            temp_dir: std::env::temp_dir().join("ytclip"),
            max_clip_seconds: 900,
            trim_strategy: TrimStrategy::default(),
            max_concurrent_jobs: num_cpus::get().max(1),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://yt-clipper.vercel.app".to_string(),
                "https://yt-clipper-frontend.vercel.app".to_string(),
            ],
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            ytdlp: YtdlpConfig::default(),
            ffmpeg: FfmpegConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Retrieval binary for the configured environment
    pub fn ytdlp_program(&self) -> PathBuf {
        if let Some(path) = &self.ytdlp.path {
            return path.clone();
        }
        match self.environment {
            Environment::Production => self.ytdlp.production_path.clone(),
            Environment::Development => self.ytdlp.development_path.clone(),
        }
    }

    pub fn validate(&self) -> ClipResult<()> {
        if self.max_clip_seconds == 0 {
            return Err(ClipError::config("max_clip_seconds must be greater than 0"));
        }
        if self.watch.interval_ms == 0 {
            return Err(ClipError::config("watch.interval_ms must be greater than 0"));
        }
        if self.watch.interval_ms > self.watch.timeout_ms {
            return Err(ClipError::config(format!(
                "watch.interval_ms ({}) must not exceed watch.timeout_ms ({})",
                self.watch.interval_ms, self.watch.timeout_ms
            )));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(ClipError::config("max_concurrent_jobs must be greater than 0"));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ClipError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        QualityFormats::with_overrides(&self.ytdlp.quality_formats)?;
        Ok(())
    }
}
