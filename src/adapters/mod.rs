// Adapters - External system implementations

pub mod command;
pub mod ffmpeg;
pub mod fs_cleanup;
pub mod poll_watch;
pub mod toml_config;
pub mod tracing_log;
pub mod ytdlp;

// Re-export adapters
pub use ffmpeg::FFmpegAdapter;
pub use fs_cleanup::FsCleanupAdapter;
pub use poll_watch::PollingWatcher;
pub use tracing_log::TracingProgressObserver;
pub use ytdlp::YtdlpAdapter;
