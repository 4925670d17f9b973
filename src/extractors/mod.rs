use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Canonical video identifier understood by the caption providers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Wrap a raw identifier, rejecting empty tokens
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for tools that want a full URL
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video identifier from a YouTube URL.
///
/// Two shapes are recognized: `youtube.com/...?v=<id>` and `youtu.be/<id>`. Anything else,
/// including strings that do not parse as URLs, yields `None`.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let parsed = Url::parse(input.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    if host.contains("youtube.com") {
        if let Some(id) = parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .and_then(|(_, value)| VideoId::new(value.into_owned()))
        {
            return Some(id);
        }
    }

    if host.contains("youtu.be") {
        return VideoId::new(parsed.path().trim_start_matches('/'));
    }

    None
}
