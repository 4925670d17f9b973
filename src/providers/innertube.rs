use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{CaptionTrackKind, FetchedTranscript, TranscriptApi, TranscriptSnippet};
use crate::config::InnertubeConfig;
use crate::extractors::VideoId;
use crate::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    captions: Option<Captions>,
    playability_status: Option<PlayabilityStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// One entry of the player's caption track list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn track_kind(&self) -> CaptionTrackKind {
        if self.kind.as_deref() == Some("asr") {
            CaptionTrackKind::Automatic
        } else {
            CaptionTrackKind::Manual
        }
    }
}

/// Find the best track for the requested languages, manual before automatic.
///
/// Every requested language is first tried as an exact tag, then as a regional variant
/// (`en` matches `en-GB`), in request order.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    let lookup = move |matches: &dyn Fn(&str, &str) -> bool| {
        languages.iter().find_map(|lang| {
            [CaptionTrackKind::Manual, CaptionTrackKind::Automatic]
                .into_iter()
                .find_map(|kind| {
                    tracks
                        .iter()
                        .find(|track| track.track_kind() == kind && matches(&track.language_code, lang.as_str()))
                })
        })
    };

    lookup(&|code, lang| code == lang).or_else(|| {
        lookup(&|code, lang| {
            code.strip_prefix(lang)
                .and_then(|rest| rest.strip_prefix('-'))
                .is_some_and(|suffix| !suffix.is_empty())
        })
    })
}

/// Turn a `json3` timed-text document into snippets
pub fn parse_timed_text(document: &Value) -> Vec<TranscriptSnippet> {
    document
        .get("events")
        .and_then(Value::as_array)
        .map(|events| events.iter().filter_map(TranscriptSnippet::from_value).collect())
        .unwrap_or_default()
}

/// Transcript API speaking YouTube's player endpoint directly
pub struct InnertubeApi {
    client: Client,
    config: InnertubeConfig,
}

impl InnertubeApi {
    pub fn new(config: InnertubeConfig, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    async fn caption_tracks(&self, video: &VideoId) -> Result<Vec<CaptionTrack>> {
        let mut endpoint = format!("{}/youtubei/v1/player", self.config.base_url.trim_end_matches('/'));
        if let Some(key) = &self.config.api_key {
            endpoint = format!("{}?key={}", endpoint, key);
        }

        tracing::debug!("Requesting player response for: {}", video);

        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": self.config.client_version,
                    "hl": "en"
                }
            },
            "videoId": video.as_str()
        });

        let response = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .context("Player request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Player request failed: HTTP {}", response.status());
        }

        let player: PlayerResponse = response.json().await.context("Failed to parse player response")?;

        if let Some(status) = &player.playability_status {
            if status.status.as_deref().is_some_and(|s| s != "OK") && player.captions.is_none() {
                anyhow::bail!(
                    "Video unavailable: {}",
                    status.reason.as_deref().unwrap_or("no reason given")
                );
            }
        }

        Ok(player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|r| r.caption_tracks)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TranscriptApi for InnertubeApi {
    async fn fetch_transcript(&self, video: &VideoId, languages: &[String]) -> Result<FetchedTranscript> {
        let tracks = self.caption_tracks(video).await?;
        if tracks.is_empty() {
            anyhow::bail!("Transcripts are disabled for video {}", video);
        }

        let track = select_track(&tracks, languages).ok_or_else(|| {
            let offered: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            anyhow::anyhow!(
                "No transcript found for languages [{}] (available: {})",
                languages.join(", "),
                offered.join(", ")
            )
        })?;

        tracing::info!("Using {} transcript track: {}", track.track_kind(), track.language_code);

        let url = format!("{}&fmt=json3", track.base_url.replace("\\u0026", "&"));
        let response = self.client.get(&url).send().await.context("Timed text request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("Timed text request failed: HTTP {}", response.status());
        }

        let document: Value = response.json().await.context("Failed to parse timed text")?;

        Ok(FetchedTranscript {
            language: Some(track.language_code.clone()),
            kind: Some(track.track_kind()),
            snippets: parse_timed_text(&document),
        })
    }
}
