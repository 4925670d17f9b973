use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Strategy;

#[derive(Parser)]
#[command(
    name = "scribe",
    about = "Subtitle Scribe - Extract plain-text transcripts from YouTube captions",
    version,
    long_about = "Resolves the best caption track for a YouTube video (manual before automatic, preferred languages first), downloads it and turns the timed subtitles into clean, deduplicated text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the transcript of a video
    Fetch {
        /// YouTube URL (youtube.com/watch?v=... or youtu.be/...)
        #[arg(value_name = "URL")]
        url: String,

        /// Preferred language, repeatable, most wanted first (default from config: tr, en)
        #[arg(short, long = "lang", value_name = "LANG")]
        languages: Vec<String>,

        /// Retrieval strategy
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Timeout for each external call in seconds
        #[arg(short, long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show which caption languages a video advertises
    Probe {
        #[arg(value_name = "URL")]
        url: String,

        /// Preferred language, repeatable
        #[arg(short, long = "lang", value_name = "LANG")]
        languages: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Convert a local subtitle file to plain text
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the video identifier of a URL
    Id {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Print the configuration file path
        #[arg(short, long)]
        path: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with track metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
