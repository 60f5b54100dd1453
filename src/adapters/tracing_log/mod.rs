// Tracing log adapter - Subscriber bootstrap and tool progress reporting

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::ports::ProgressObserver;

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is harmless;
/// the second subscriber is simply not installed.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if result.is_ok() {
        debug!("Logging initialized at level {} ({:?})", level, format);
    }
}

/// Progress observer that writes tool activity to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressObserver;

impl ProgressObserver for TracingProgressObserver {
    fn on_start(&self, tool: &str, command_line: &str) {
        info!("Spawned {} with command: {}", tool, command_line);
    }

    fn on_progress(&self, tool: &str, percent: f64) {
        debug!("{} processing: {:.0}% done", tool, percent);
    }
}
