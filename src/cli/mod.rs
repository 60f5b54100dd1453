//! CLI module for ytclip
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// ytclip clip service
///
/// Cuts time-bounded clips out of online videos by driving yt-dlp and
/// ffmpeg, and serves them over HTTP.
#[derive(Parser, Debug)]
#[command(name = "ytclip")]
#[command(about = "ytclip - Online video clip trimming service")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: args::GlobalArgs,

    /// The command to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server
    #[default]
    Serve,
    /// Verify that yt-dlp and ffmpeg are usable
    Check,
    /// Print the effective configuration as TOML
    PrintConfig,
}
