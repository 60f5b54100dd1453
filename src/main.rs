//! ytclip clip service
//!
//! HTTP shim that cuts a time-bounded clip out of an online video by
//! running yt-dlp and ffmpeg, then streams the result back.
//!
//! # Usage
//!
//! ```bash
//! ytclip serve --port 3001
//! ytclip check
//! ytclip print-config --config ytclip.toml
//! ```

use anyhow::Result;
use clap::Parser;

use ytclip::adapters::tracing_log::init_logging;
use ytclip::cli::{commands, Cli, Commands};
use ytclip::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the ytclip binary
#[tokio::main]
async fn main() -> Result<()> {
    // `.env` feeds the process environment before clap reads `env` fallbacks
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let resolved = initialize_configuration_hierarchy(&cli)?;
    init_logging(&resolved.config.log_level, resolved.config.log_format);
    resolved.log_sources();
    let config = resolved.config;

    match cli.command.unwrap_or_default() {
        Commands::Serve => commands::serve(config).await,
        Commands::Check => commands::check(&config).await,
        Commands::PrintConfig => commands::print_config(&config),
    }
}
