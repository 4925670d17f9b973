//! Subtitle Scribe - extract plain-text transcripts from YouTube captions
//!
//! This library resolves which caption track to use for a video (manual before automatic,
//! preferred languages first), retrieves it through yt-dlp or the player API, and turns the
//! timed subtitle document into deduplicated prose.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod language;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod ranking;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::{Config, Strategy};
pub use extractors::{extract_video_id, VideoId};
pub use language::pick_language;
pub use normalize::normalize;
pub use pipeline::{Transcript, TranscriptPipeline, TranscriptSource};
pub use providers::{CaptionAvailability, CaptionTrackKind};

/// Result type used for provider plumbing throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Coarse classification of a [`ScribeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InfoFetch,
    NoSubtitles,
    Download,
    Read,
    Io,
    Api,
}

/// Errors surfaced at the pipeline boundary
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error("Error fetching video info: {0}")]
    InfoFetch(String),

    #[error("No subtitles found (no manual or automatic captions advertised)")]
    NoSubtitlesAdvertised,

    #[error("No subtitles found (captions were advertised but no subtitle file was produced)")]
    NoSubtitlesDownloaded,

    #[error("Manual subtitles download failed: {0}")]
    ManualDownloadFailed(String),

    #[error("Auto subtitles download failed: {0}")]
    AutoDownloadFailed(String),

    #[error("Error reading subtitle file: {0}")]
    ReadFailed(String),

    #[error("Transcript API error: {0}")]
    Api(String),

    #[error("Error creating temporary directory: {0}")]
    TempDir(String),
}

impl ScribeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScribeError::InvalidUrl => ErrorKind::InvalidInput,
            ScribeError::InfoFetch(_) => ErrorKind::InfoFetch,
            ScribeError::NoSubtitlesAdvertised | ScribeError::NoSubtitlesDownloaded => {
                ErrorKind::NoSubtitles
            }
            ScribeError::ManualDownloadFailed(_) | ScribeError::AutoDownloadFailed(_) => {
                ErrorKind::Download
            }
            ScribeError::ReadFailed(_) => ErrorKind::Read,
            ScribeError::Api(_) => ErrorKind::Api,
            ScribeError::TempDir(_) => ErrorKind::Io,
        }
    }
}

/// Render an `anyhow` chain on one line, outermost context first
pub(crate) fn describe(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
