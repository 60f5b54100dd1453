// TOML config adapter - Configuration loading from files and the environment

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::{ClipError, ClipResult};

/// Table name used when settings are nested instead of at the file root
pub const CONFIG_TABLE: &str = "ytclip";

/// Files probed, in order, when no explicit config path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/production.toml",
    "config/development.toml",
    "ytclip.toml",
];

/// Parse configuration from TOML text.
///
/// Settings may live under a `[ytclip]` table or at the file root.
/// Missing keys keep their defaults.
pub fn parse_config(content: &str) -> ClipResult<AppConfig> {
    let mut parsed: toml::Table = toml::from_str(content)
        .map_err(|e| ClipError::config(format!("Failed to parse TOML config: {}", e)))?;

    let table = match parsed.remove(CONFIG_TABLE) {
        Some(toml::Value::Table(section)) => section,
        Some(_) => {
            return Err(ClipError::config(format!(
                "[{}] must be a table",
                CONFIG_TABLE
            )))
        }
        None => parsed,
    };

    toml::Value::Table(table)
        .try_into()
        .map_err(|e| ClipError::config(format!("Invalid configuration: {}", e)))
}

/// Load configuration from a file that must exist
pub fn load_config_file(path: &Path) -> ClipResult<AppConfig> {
    if !path.exists() {
        return Err(ClipError::config(format!(
            "Config file does not exist: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ClipError::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    parse_config(&content)
}

/// First existing default config file under `base`
pub fn find_default_config(base: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(|p| base.join(p))
        .find(|p| p.is_file())
}

/// Apply environment overrides on top of `config`.
///
/// `lookup` abstracts the process environment so overrides can be tested.
/// Returns the number of variables that were applied.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> ClipResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    let mut get = |name: &str| {
        let value = lookup(name).filter(|v| !v.trim().is_empty());
        if value.is_some() {
            applied += 1;
        }
        value
    };

    if let Some(v) = get("PORT") {
        config.port = parse_number("PORT", &v)?;
    }
    if let Some(v) = get("YTCLIP_ENV") {
        config.environment = v.parse()?;
    }
    if let Some(v) = get("YTCLIP_TEMP_DIR") {
        config.temp_dir = PathBuf::from(v);
    }
    if let Some(v) = get("YTCLIP_MAX_CLIP_SECONDS") {
        config.max_clip_seconds = parse_number("YTCLIP_MAX_CLIP_SECONDS", &v)?;
    }
    if let Some(v) = get("YTCLIP_YTDLP_PATH") {
        config.ytdlp.path = Some(PathBuf::from(v));
    }
    if let Some(v) = get("YTCLIP_FFMPEG_PATH") {
        config.ffmpeg.path = PathBuf::from(v);
    }
    if let Some(v) = get("YTCLIP_LOG_LEVEL") {
        config.log_level = v.trim().to_ascii_lowercase();
    }
    if let Some(v) = get("YTCLIP_LOG_FORMAT") {
        config.log_format = v.parse()?;
    }
    if let Some(v) = get("YTCLIP_MAX_CONCURRENT_JOBS") {
        config.max_concurrent_jobs = parse_number("YTCLIP_MAX_CONCURRENT_JOBS", &v)?;
    }
    if let Some(v) = get("YTCLIP_SERVER_SIDE_SECTIONS") {
        config.ytdlp.server_side_sections = parse_bool("YTCLIP_SERVER_SIDE_SECTIONS", &v)?;
    }
    if let Some(v) = get("YTCLIP_TRIM_STRATEGY") {
        config.trim_strategy = v.parse()?;
    }

    Ok(applied)
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> ClipResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ClipError::config(format!("{} must be a number, got '{}'", name, value)))
}

fn parse_bool(name: &str, value: &str) -> ClipResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClipError::config(format!(
            "{} must be a boolean, got '{}'",
            name, value
        ))),
    }
}
