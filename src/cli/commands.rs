//! Command implementations

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::fs_cleanup::{sweep_stale, STALE_AFTER};
use crate::app::DefaultAppContainer;
use crate::config::AppConfig;
use crate::http::{router, AppState};

/// Execute the serve command
pub async fn serve(config: AppConfig) -> Result<()> {
    info!(
        "Starting ytclip ({} environment, temp dir {})",
        config.environment,
        config.temp_dir.display()
    );

    tokio::fs::create_dir_all(&config.temp_dir)
        .await
        .with_context(|| format!("failed to create temp dir {}", config.temp_dir.display()))?;
    sweep_stale(&config.temp_dir, STALE_AFTER);

    let container =
        DefaultAppContainer::from_config(&config).context("initializing clip service")?;
    if !container.verify_tools().await.all_ok() {
        warn!("External tools are missing; clip requests will fail until they are installed");
    }

    let app = router(AppState::new(&container, config.allowed_origins.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!("Server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    info!("Server stopped");
    Ok(())
}

/// Execute the check command
pub async fn check(config: &AppConfig) -> Result<()> {
    let container = DefaultAppContainer::from_config(config)?;
    let report = container.verify_tools().await;

    for (tool, result) in [("yt-dlp", &report.ytdlp), ("ffmpeg", &report.ffmpeg)] {
        match result {
            Ok(version) => println!("{}: {}", tool, version),
            Err(e) => println!("{}: unavailable ({})", tool, e),
        }
    }

    if !report.all_ok() {
        anyhow::bail!("One or more external tools are unavailable");
    }
    Ok(())
}

/// Execute the print-config command
pub fn print_config(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("serializing configuration")?;
    print!("{}", rendered);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
