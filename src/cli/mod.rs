//! CLI module for Notat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_duration, Output};

use clap::{Parser, Subcommand};

/// Notat - Lecture Digestion
///
/// A CLI tool that turns lectures into compressed audio, transcripts, and
/// AI-generated study guides. The name "Notat" comes from the Norwegian word
/// for "note."
#[derive(Parser, Debug)]
#[command(name = "notat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Notat and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Digest a lecture into audio, transcript, and study guide
    Process {
        /// Local video/audio file path, or a remote URL
        input: String,

        /// Display title (defaults to the source-reported title)
        #[arg(short, long)]
        title: Option<String>,

        /// Print the finished record as JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "summary.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
