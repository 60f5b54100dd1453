//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::toml_config::{apply_env_overrides, find_default_config, load_config_file};
use crate::cli::args::GlobalArgs;
use crate::cli::Cli;
use crate::config::AppConfig;

/// Effective configuration plus the layers it was built from.
///
/// Resolution happens before the subscriber exists, so the sources are
/// kept here and logged afterwards with [`ResolvedConfig::log_sources`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AppConfig,
    /// Configuration file that was read, if any
    pub file: Option<PathBuf>,
    /// Number of environment variables that overrode file values
    pub env_overrides: usize,
}

impl ResolvedConfig {
    pub fn log_sources(&self) {
        match &self.file {
            Some(path) => info!("Loaded configuration from: {}", path.display()),
            None => info!("No configuration file found, using defaults"),
        }
        if self.env_overrides > 0 {
            info!(
                "Applied {} environment variable overrides",
                self.env_overrides
            );
        }
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults.
///
/// `.env` must already be loaded so clap sees its values too.
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<ResolvedConfig> {
    // Step 1: file over defaults
    let (mut config, file) = load_file_layer(cli.overrides.config.as_deref())?;

    // Step 2: environment variables
    let env_overrides = apply_env_overrides(&mut config, |name| std::env::var(name).ok())
        .context("invalid environment configuration")?;

    // Step 3: CLI arguments
    apply_cli_configuration_overrides(&mut config, &cli.overrides);

    config.validate().context("invalid configuration")?;
    Ok(ResolvedConfig {
        config,
        file,
        env_overrides,
    })
}

fn load_file_layer(explicit: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_default_config(Path::new(".")) {
            Some(path) => path,
            None => return Ok((AppConfig::default(), None)),
        },
    };

    let config = load_config_file(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    Ok((config, Some(path)))
}

/// Apply CLI argument overrides to configuration
fn apply_cli_configuration_overrides(config: &mut AppConfig, args: &GlobalArgs) {
    if let Some(level) = &args.log_level {
        config.log_level = level.trim().to_ascii_lowercase();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(temp_dir) = &args.temp_dir {
        config.temp_dir = temp_dir.clone();
    }
    if let Some(environment) = args.environment {
        config.environment = environment;
    }
}
