//! ytclip Library
//!
//! Clip-request orchestration around two external tools: yt-dlp retrieves
//! the source media and ffmpeg cuts the requested range out of it.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod http;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{ClipInteractor, ClipOutput, ClipPorts, ClipSettings};
pub use config::AppConfig;
pub use domain::model::{ClipParams, ClipRequest, Quality, Timecode, TrimStrategy};
pub use error::{ClipError, ClipResult};
