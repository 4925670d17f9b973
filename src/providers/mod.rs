use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod innertube;
pub mod ytdlp;

use crate::extractors::VideoId;
use crate::Result;

/// Who authored a caption track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionTrackKind {
    /// Authored by the uploader or a human captioner
    Manual,
    /// Machine generated speech recognition
    Automatic,
}

impl CaptionTrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionTrackKind::Manual => "manual",
            CaptionTrackKind::Automatic => "automatic",
        }
    }
}

impl fmt::Display for CaptionTrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advertised caption languages for one video, in provider order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionAvailability {
    pub manual: Vec<String>,
    pub automatic: Vec<String>,
}

impl CaptionAvailability {
    pub fn languages(&self, kind: CaptionTrackKind) -> &[String] {
        match kind {
            CaptionTrackKind::Manual => &self.manual,
            CaptionTrackKind::Automatic => &self.automatic,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.automatic.is_empty()
    }
}

/// One timed piece of transcript text returned by a transcript API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    pub text: String,
    pub start: Option<f64>,
    pub duration: Option<f64>,
}

impl TranscriptSnippet {
    /// Build a snippet from whatever shape the provider handed back.
    ///
    /// Accepts a bare string, a record with a `text` member, or a timed-text event whose
    /// `segs` carry `utf8` pieces. Returns `None` when no text can be found.
    pub fn from_value(value: &Value) -> Option<Self> {
        let text = match value {
            Value::String(text) => text.clone(),
            Value::Object(map) => match map.get("text") {
                Some(Value::String(text)) => text.clone(),
                _ => map
                    .get("segs")?
                    .as_array()?
                    .iter()
                    .filter_map(|seg| seg.get("utf8").and_then(Value::as_str))
                    .collect::<String>(),
            },
            _ => return None,
        };

        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let number = |key: &str, divisor: f64| value.get(key).and_then(Value::as_f64).map(|n| n / divisor);

        Some(Self {
            text: text.to_string(),
            start: number("start", 1.0).or_else(|| number("tStartMs", 1000.0)),
            duration: number("duration", 1.0).or_else(|| number("dDurationMs", 1000.0)),
        })
    }
}

/// Metadata-only caption lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionMetadataProvider: Send + Sync {
    /// List manual and automatic caption languages without downloading anything
    async fn probe(&self, video: &VideoId) -> Result<CaptionAvailability>;
}

/// Subtitle file downloader
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionContentProvider: Send + Sync {
    /// Download `kind` subtitles for `languages` into `destination` and return the files written
    async fn download(
        &self,
        video: &VideoId,
        languages: &[String],
        kind: CaptionTrackKind,
        destination: &Path,
    ) -> Result<Vec<PathBuf>>;
}

/// Structured transcript API that performs its own language matching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptApi: Send + Sync {
    async fn fetch_transcript(
        &self,
        video: &VideoId,
        languages: &[String],
    ) -> Result<FetchedTranscript>;
}

/// Snippets plus the track the API settled on
#[derive(Debug, Clone, Default)]
pub struct FetchedTranscript {
    pub language: Option<String>,
    pub kind: Option<CaptionTrackKind>,
    pub snippets: Vec<TranscriptSnippet>,
}

impl FetchedTranscript {
    /// Snippet texts in order, one per line
    pub fn text(&self) -> String {
        self.snippets
            .iter()
            .map(|snippet| snippet.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
