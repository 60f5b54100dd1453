//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::config::Environment;

/// Options accepted by every command. Each one overrides the
/// environment and the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "YTCLIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Directory for temporary media files
    #[arg(long, global = true)]
    pub temp_dir: Option<PathBuf>,

    /// Deployment environment, selects the yt-dlp binary
    #[arg(long, global = true, value_parser = parse_environment)]
    pub environment: Option<Environment>,
}

fn parse_environment(value: &str) -> Result<Environment, String> {
    value.parse().map_err(|e: crate::error::ClipError| e.to_string())
}
