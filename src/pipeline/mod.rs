use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use crate::config::{Config, Strategy};
use crate::extractors::{extract_video_id, VideoId};
use crate::language::pick_language;
use crate::normalize::normalize;
use crate::providers::innertube::InnertubeApi;
use crate::providers::ytdlp::YtDlp;
use crate::providers::{
    CaptionAvailability, CaptionContentProvider, CaptionMetadataProvider, CaptionTrackKind,
    TranscriptApi,
};
use crate::ranking::select_candidate;
use crate::{describe, ScribeError};

/// Where a transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    Api,
    Download,
}

/// Normalized transcript with the track it was built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,
    pub language: Option<String>,
    pub kind: Option<CaptionTrackKind>,
    pub source: TranscriptSource,
    pub text: String,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl Transcript {
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Advertised captions and what the selector would choose per tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub video_id: VideoId,
    pub availability: CaptionAvailability,
    pub manual_pick: Option<String>,
    pub automatic_pick: Option<String>,
}

/// A tier that produced at least one subtitle file
struct TierHit {
    kind: CaptionTrackKind,
    language: String,
    files: Vec<PathBuf>,
}

/// URL to transcript pipeline
pub struct TranscriptPipeline {
    languages: Vec<String>,
    strategy: Strategy,
    timeout: Duration,
    temp_root: Option<PathBuf>,
    metadata: Box<dyn CaptionMetadataProvider>,
    content: Box<dyn CaptionContentProvider>,
    api: Box<dyn TranscriptApi>,
}

impl TranscriptPipeline {
    /// Create a pipeline backed by yt-dlp and the player API
    pub fn new(config: &Config) -> crate::Result<Self> {
        let timeout = config.timeout();
        let api = InnertubeApi::new(config.innertube.clone(), &config.user_agent, timeout)?;

        Ok(Self::with_providers(
            config,
            Box::new(YtDlp::new(config.yt_dlp_path.clone(), timeout)),
            Box::new(YtDlp::new(config.yt_dlp_path.clone(), timeout)),
            Box::new(api),
        ))
    }

    /// Create a pipeline over explicit providers
    pub fn with_providers(
        config: &Config,
        metadata: Box<dyn CaptionMetadataProvider>,
        content: Box<dyn CaptionContentProvider>,
        api: Box<dyn TranscriptApi>,
    ) -> Self {
        Self {
            languages: config.languages.clone(),
            strategy: config.strategy,
            timeout: config.timeout(),
            temp_root: config.temp_dir.clone(),
            metadata,
            content,
            api,
        }
    }

    /// Fetch a transcript for a video URL
    pub async fn fetch(&self, url: &str) -> Result<Transcript, ScribeError> {
        let video = extract_video_id(url).ok_or(ScribeError::InvalidUrl)?;
        tracing::info!("Fetching transcript for {} ({} strategy)", video, self.strategy);

        match self.strategy {
            Strategy::Tiered => self.fetch_tiered(&video).await,
            Strategy::Direct => self.fetch_direct(&video).await,
            Strategy::DirectThenTiered => match self.fetch_direct(&video).await {
                Ok(transcript) if !transcript.text.is_empty() => Ok(transcript),
                Ok(_) => {
                    tracing::warn!("Transcript API returned no text, falling back to subtitle download");
                    self.fetch_tiered(&video).await
                }
                Err(err) => {
                    tracing::warn!("{}, falling back to subtitle download", err);
                    self.fetch_tiered(&video).await
                }
            },
        }
    }

    /// Report advertised captions without downloading anything
    pub async fn probe(&self, url: &str) -> Result<ProbeReport, ScribeError> {
        let video = extract_video_id(url).ok_or(ScribeError::InvalidUrl)?;
        let availability = self.probe_availability(&video).await?;

        Ok(ProbeReport {
            manual_pick: pick_language(&availability.manual, &self.languages),
            automatic_pick: pick_language(&availability.automatic, &self.languages),
            video_id: video,
            availability,
        })
    }

    async fn fetch_direct(&self, video: &VideoId) -> Result<Transcript, ScribeError> {
        let fetched = self
            .bounded(self.api.fetch_transcript(video, &self.languages))
            .await
            .map_err(|err| ScribeError::Api(describe(&err)))?;

        tracing::info!("Transcript API returned {} snippets", fetched.snippets.len());

        Ok(Transcript {
            video_id: video.clone(),
            text: fetched.text(),
            language: fetched.language,
            kind: fetched.kind,
            source: TranscriptSource::Api,
            fetched_at: chrono::Utc::now(),
        })
    }

    async fn fetch_tiered(&self, video: &VideoId) -> Result<Transcript, ScribeError> {
        let availability = self.probe_availability(video).await?;
        tracing::info!(
            "Captions advertised: manual [{}], automatic [{}]",
            availability.manual.join(", "),
            availability.automatic.join(", ")
        );

        let scratch = self.scratch_dir()?;
        let result = self.download_and_read(video, &availability, scratch.path()).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(err) = scratch.close() {
            tracing::warn!("Failed to remove {}: {}", scratch_path.display(), err);
        }

        result
    }

    async fn probe_availability(&self, video: &VideoId) -> Result<CaptionAvailability, ScribeError> {
        self.bounded(self.metadata.probe(video))
            .await
            .map_err(|err| ScribeError::InfoFetch(describe(&err)))
    }

    async fn download_and_read(
        &self,
        video: &VideoId,
        availability: &CaptionAvailability,
        scratch: &Path,
    ) -> Result<Transcript, ScribeError> {
        let hit = self.download_first_tier(video, availability, scratch).await?;

        let chosen = select_candidate(&hit.files).ok_or(ScribeError::NoSubtitlesDownloaded)?;
        tracing::debug!("Reading subtitle file: {}", chosen.display());

        let document = tokio::fs::read_to_string(chosen)
            .await
            .map_err(|err| ScribeError::ReadFailed(err.to_string()))?;

        let text = normalize(&document);
        if text.is_empty() {
            tracing::warn!("Subtitle file {} contained no cue text", chosen.display());
        }

        Ok(Transcript {
            video_id: video.clone(),
            language: Some(hit.language),
            kind: Some(hit.kind),
            source: TranscriptSource::Download,
            text,
            fetched_at: chrono::Utc::now(),
        })
    }

    /// Walk manual then automatic tracks until one yields a subtitle file.
    ///
    /// Each tier downloads into its own subdirectory of `scratch`, so files left behind by a
    /// failed tier are never picked up by the next one. A failure only moves on to the next
    /// tier; the failure of the last tier attempted is what the caller sees.
    async fn download_first_tier(
        &self,
        video: &VideoId,
        availability: &CaptionAvailability,
        scratch: &Path,
    ) -> Result<TierHit, ScribeError> {
        let mut last_failure = None;

        for kind in [CaptionTrackKind::Manual, CaptionTrackKind::Automatic] {
            let Some(language) = pick_language(availability.languages(kind), &self.languages) else {
                tracing::debug!("No {} captions advertised", kind);
                continue;
            };

            tracing::info!("Downloading {} captions: {}", kind, language);
            let requested = [language.clone()];

            let destination = scratch.join(kind.as_str());
            let attempt = match tokio::fs::create_dir(&destination).await {
                Ok(()) => {
                    self.bounded(self.content.download(video, &requested, kind, &destination))
                        .await
                }
                Err(err) => Err(anyhow::Error::new(err)
                    .context(format!("Failed to create {}", destination.display()))),
            };

            match attempt {
                Ok(files) if !files.is_empty() => {
                    return Ok(TierHit { kind, language, files });
                }
                Ok(_) => {
                    tracing::warn!("{} captions ({}) produced no subtitle file", kind, language);
                    last_failure = None;
                }
                Err(err) => {
                    tracing::warn!("{} captions ({}) download failed: {:#}", kind, language, err);
                    last_failure = Some((kind, describe(&err)));
                }
            }
        }

        Err(match last_failure {
            Some((CaptionTrackKind::Automatic, message)) => ScribeError::AutoDownloadFailed(message),
            Some((CaptionTrackKind::Manual, message)) => ScribeError::ManualDownloadFailed(message),
            None if availability.is_empty() => ScribeError::NoSubtitlesAdvertised,
            None => ScribeError::NoSubtitlesDownloaded,
        })
    }

    fn scratch_dir(&self) -> Result<TempDir, ScribeError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("scribe-");

        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|err| ScribeError::TempDir(err.to_string()))
    }

    async fn bounded<T, F>(&self, call: F) -> crate::Result<T>
    where
        F: Future<Output = crate::Result<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| anyhow::anyhow!("timed out after {}s", self.timeout.as_secs()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        FetchedTranscript, MockCaptionContentProvider, MockCaptionMetadataProvider, MockTranscriptApi,
        TranscriptSnippet,
    };
    use crate::ErrorKind;
    use std::sync::{Arc, Mutex};

    const URL: &str = "https://www.youtube.com/watch?v=abc123";
    const VTT: &str = "WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.000\nHello <00:00:00.500>there\n\n2\n00:00:02.000 --> 00:00:04.000\nHello there\n";

    fn build(
        strategy: Strategy,
        metadata: MockCaptionMetadataProvider,
        content: MockCaptionContentProvider,
        api: MockTranscriptApi,
    ) -> TranscriptPipeline {
        let config = Config {
            strategy,
            timeout_secs: 5,
            ..Config::default()
        };
        TranscriptPipeline::with_providers(&config, Box::new(metadata), Box::new(content), Box::new(api))
    }

    fn advertising(manual: &[&str], automatic: &[&str]) -> MockCaptionMetadataProvider {
        let availability = CaptionAvailability {
            manual: manual.iter().map(|s| s.to_string()).collect(),
            automatic: automatic.iter().map(|s| s.to_string()).collect(),
        };
        let mut metadata = MockCaptionMetadataProvider::new();
        metadata
            .expect_probe()
            .times(1)
            .returning(move |_| Ok(availability.clone()));
        metadata
    }

    fn write_sub(dest: &Path, lang: &str, body: &str) -> PathBuf {
        let path = dest.join(format!("abc123.{}.vtt", lang));
        fs_err::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_invalid_url_touches_no_provider() {
        let pipeline = build(
            Strategy::Tiered,
            MockCaptionMetadataProvider::new(),
            MockCaptionContentProvider::new(),
            MockTranscriptApi::new(),
        );

        let err = pipeline.fetch("https://example.com/video").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Invalid YouTube URL");
    }

    #[tokio::test]
    async fn test_probe_failure_is_terminal() {
        let mut metadata = MockCaptionMetadataProvider::new();
        metadata
            .expect_probe()
            .returning(|_| Err(anyhow::anyhow!("Video unavailable")));

        let pipeline = build(Strategy::Tiered, metadata, MockCaptionContentProvider::new(), MockTranscriptApi::new());

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.to_string(), "Error fetching video info: Video unavailable");
    }

    #[tokio::test]
    async fn test_manual_track_is_used_when_present() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .withf(|video, langs, kind, _| {
                video.as_str() == "abc123" && langs == ["en-GB".to_string()] && *kind == CaptionTrackKind::Manual
            })
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                Ok(vec![write_sub(dest, "en-GB", VTT)])
            });

        let pipeline = build(Strategy::Tiered, advertising(&["de", "en-GB"], &["en"]), content, MockTranscriptApi::new());

        let transcript = pipeline.fetch(URL).await.unwrap();
        assert_eq!(transcript.text, "Hello there");
        assert_eq!(transcript.language.as_deref(), Some("en-GB"));
        assert_eq!(transcript.kind, Some(CaptionTrackKind::Manual));
        assert_eq!(transcript.source, TranscriptSource::Download);
    }

    #[tokio::test]
    async fn test_silent_manual_download_falls_through_to_automatic() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .withf(|_, _, kind, _| *kind == CaptionTrackKind::Manual)
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, _: &Path| Ok(Vec::new()));
        content
            .expect_download()
            .withf(|_, langs, kind, _| langs == ["tr".to_string()] && *kind == CaptionTrackKind::Automatic)
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                Ok(vec![write_sub(dest, "tr", VTT)])
            });

        let pipeline = build(Strategy::Tiered, advertising(&["en"], &["en", "tr"]), content, MockTranscriptApi::new());

        let transcript = pipeline.fetch(URL).await.unwrap();
        assert_eq!(transcript.kind, Some(CaptionTrackKind::Automatic));
        assert_eq!(transcript.language.as_deref(), Some("tr"));
        assert_eq!(transcript.text, "Hello there");
    }

    #[tokio::test]
    async fn test_manual_download_error_falls_through_to_automatic() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .withf(|_, _, kind, _| *kind == CaptionTrackKind::Manual)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, _: &Path| {
                Err(anyhow::anyhow!("HTTP Error 429"))
            });
        content
            .expect_download()
            .withf(|_, _, kind, _| *kind == CaptionTrackKind::Automatic)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                Ok(vec![write_sub(dest, "en", "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nauto text\n")])
            });

        let pipeline = build(Strategy::Tiered, advertising(&["en"], &["en"]), content, MockTranscriptApi::new());

        let transcript = pipeline.fetch(URL).await.unwrap();
        assert_eq!(transcript.text, "auto text");
    }

    #[tokio::test]
    async fn test_nothing_advertised() {
        let pipeline = build(
            Strategy::Tiered,
            advertising(&[], &[]),
            MockCaptionContentProvider::new(),
            MockTranscriptApi::new(),
        );

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert!(matches!(err, ScribeError::NoSubtitlesAdvertised));
        assert!(err.to_string().starts_with("No subtitles found"));
    }

    #[tokio::test]
    async fn test_advertised_but_nothing_written() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, _: &Path| Ok(Vec::new()));

        let pipeline = build(Strategy::Tiered, advertising(&["tr"], &[]), content, MockTranscriptApi::new());

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert!(matches!(err, ScribeError::NoSubtitlesDownloaded));
    }

    #[tokio::test]
    async fn test_automatic_failure_is_reported() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, _: &Path| {
                Err(anyhow::anyhow!("yt-dlp failed: boom"))
            });

        let pipeline = build(Strategy::Tiered, advertising(&[], &["en"]), content, MockTranscriptApi::new());

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.to_string(), "Auto subtitles download failed: yt-dlp failed: boom");
    }

    #[tokio::test]
    async fn test_ranker_picks_turkish_among_several_files() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                Ok(vec![
                    write_sub(dest, "en", "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nenglish\n"),
                    write_sub(dest, "tr", "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nturkce\n"),
                ])
            });

        let pipeline = build(Strategy::Tiered, advertising(&["tr"], &[]), content, MockTranscriptApi::new());

        assert_eq!(pipeline.fetch(URL).await.unwrap().text, "turkce");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_reported() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                Ok(vec![dest.join("abc123.tr.vtt")])
            });

        let pipeline = build(Strategy::Tiered, advertising(&["tr"], &[]), content, MockTranscriptApi::new());

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Read);
        assert!(err.to_string().starts_with("Error reading subtitle file: "));
    }

    #[tokio::test]
    async fn test_scratch_directory_is_removed_on_every_path() {
        let seen = Arc::new(Mutex::new(Vec::<PathBuf>::new()));

        let seen_ok = Arc::clone(&seen);
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .returning(move |_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                seen_ok.lock().unwrap().push(dest.to_path_buf());
                Ok(vec![write_sub(dest, "tr", VTT)])
            });
        let pipeline = build(Strategy::Tiered, advertising(&["tr"], &[]), content, MockTranscriptApi::new());
        assert!(pipeline.fetch(URL).await.is_ok());

        let seen_err = Arc::clone(&seen);
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .returning(move |_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                seen_err.lock().unwrap().push(dest.to_path_buf());
                write_sub(dest, "en", VTT);
                Err(anyhow::anyhow!("interrupted"))
            });
        let pipeline = build(Strategy::Tiered, advertising(&[], &["en"]), content, MockTranscriptApi::new());
        assert!(pipeline.fetch(URL).await.is_err());

        let dirs = seen.lock().unwrap();
        assert_eq!(dirs.len(), 2);
        assert_ne!(dirs[0], dirs[1]);
        assert!(dirs.iter().all(|dir| !dir.exists()));
    }

    #[tokio::test]
    async fn test_direct_strategy_joins_snippets() {
        let mut api = MockTranscriptApi::new();
        api.expect_fetch_transcript()
            .withf(|_, langs| langs == ["tr".to_string(), "en".to_string()])
            .returning(|_, _| {
                Ok(FetchedTranscript {
                    language: Some("en".to_string()),
                    kind: Some(CaptionTrackKind::Automatic),
                    snippets: vec![
                        TranscriptSnippet::from_value(&serde_json::json!({"text": "first"})).unwrap(),
                        TranscriptSnippet::from_value(&serde_json::json!("second")).unwrap(),
                    ],
                })
            });

        let pipeline = build(Strategy::Direct, MockCaptionMetadataProvider::new(), MockCaptionContentProvider::new(), api);

        let transcript = pipeline.fetch("https://youtu.be/abc123").await.unwrap();
        assert_eq!(transcript.text, "first\nsecond");
        assert_eq!(transcript.source, TranscriptSource::Api);
        assert_eq!(transcript.line_count(), 2);
    }

    #[tokio::test]
    async fn test_direct_strategy_error() {
        let mut api = MockTranscriptApi::new();
        api.expect_fetch_transcript()
            .returning(|_, _| Err(anyhow::anyhow!("Transcripts are disabled")));

        let pipeline = build(Strategy::Direct, MockCaptionMetadataProvider::new(), MockCaptionContentProvider::new(), api);

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
    }

    #[tokio::test]
    async fn test_direct_then_tiered_falls_back() {
        let mut api = MockTranscriptApi::new();
        api.expect_fetch_transcript()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("blocked")));

        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                Ok(vec![write_sub(dest, "tr", VTT)])
            });

        let pipeline = build(Strategy::DirectThenTiered, advertising(&["tr"], &[]), content, api);

        let transcript = pipeline.fetch(URL).await.unwrap();
        assert_eq!(transcript.source, TranscriptSource::Download);
        assert_eq!(transcript.text, "Hello there");
    }

    #[tokio::test]
    async fn test_failed_tier_leftovers_are_not_picked_up() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .withf(|_, _, kind, _| *kind == CaptionTrackKind::Manual)
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                write_sub(dest, "tr", "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nmanual partial text\n");
                Err(anyhow::anyhow!("HTTP Error 429"))
            });
        content
            .expect_download()
            .withf(|_, _, kind, _| *kind == CaptionTrackKind::Automatic)
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, dest: &Path| {
                assert!(!dest.join("abc123.tr.vtt").exists());
                write_sub(dest, "en", "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nauto text\n");
                crate::providers::ytdlp::collect_subtitle_files(dest)
            });

        let pipeline = build(Strategy::Tiered, advertising(&["tr"], &["en"]), content, MockTranscriptApi::new());

        let transcript = pipeline.fetch(URL).await.unwrap();
        assert_eq!(transcript.kind, Some(CaptionTrackKind::Automatic));
        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert_eq!(transcript.text, "auto text");
    }

    #[tokio::test]
    async fn test_manual_failure_is_reported_when_it_is_the_last_tier() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .times(1)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, _: &Path| {
                Err(anyhow::anyhow!("HTTP Error 429"))
            });

        let pipeline = build(Strategy::Tiered, advertising(&["tr"], &[]), content, MockTranscriptApi::new());

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Download);
        assert_eq!(err.to_string(), "Manual subtitles download failed: HTTP Error 429");
    }

    #[tokio::test]
    async fn test_silent_automatic_tier_after_failed_manual_reports_no_file() {
        let mut content = MockCaptionContentProvider::new();
        content
            .expect_download()
            .withf(|_, _, kind, _| *kind == CaptionTrackKind::Manual)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, _: &Path| {
                Err(anyhow::anyhow!("HTTP Error 429"))
            });
        content
            .expect_download()
            .withf(|_, _, kind, _| *kind == CaptionTrackKind::Automatic)
            .returning(|_: &VideoId, _: &[String], _: CaptionTrackKind, _: &Path| Ok(Vec::new()));

        let pipeline = build(Strategy::Tiered, advertising(&["tr"], &["en"]), content, MockTranscriptApi::new());

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert!(matches!(err, ScribeError::NoSubtitlesDownloaded));
    }

    struct StalledMetadata;

    #[async_trait::async_trait]
    impl CaptionMetadataProvider for StalledMetadata {
        async fn probe(&self, _video: &VideoId) -> crate::Result<CaptionAvailability> {
            std::future::pending().await
        }
    }

    struct StalledDownload {
        seen: Arc<Mutex<Vec<PathBuf>>>,
    }

    #[async_trait::async_trait]
    impl CaptionContentProvider for StalledDownload {
        async fn download(
            &self,
            _video: &VideoId,
            _languages: &[String],
            _kind: CaptionTrackKind,
            destination: &Path,
        ) -> crate::Result<Vec<PathBuf>> {
            self.seen.lock().unwrap().push(destination.to_path_buf());
            write_sub(destination, "en", VTT);
            std::future::pending().await
        }
    }

    struct StalledApi;

    #[async_trait::async_trait]
    impl TranscriptApi for StalledApi {
        async fn fetch_transcript(&self, _video: &VideoId, _languages: &[String]) -> crate::Result<FetchedTranscript> {
            std::future::pending().await
        }
    }

    fn stalled_config(strategy: Strategy) -> Config {
        Config {
            strategy,
            timeout_secs: 5,
            ..Config::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_metadata_lookup_times_out() {
        let pipeline = TranscriptPipeline::with_providers(
            &stalled_config(Strategy::Tiered),
            Box::new(StalledMetadata),
            Box::new(MockCaptionContentProvider::new()),
            Box::new(MockTranscriptApi::new()),
        );

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InfoFetch);
        assert!(err.to_string().contains("timed out after 5s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_api_times_out() {
        let pipeline = TranscriptPipeline::with_providers(
            &stalled_config(Strategy::Direct),
            Box::new(MockCaptionMetadataProvider::new()),
            Box::new(MockCaptionContentProvider::new()),
            Box::new(StalledApi),
        );

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_download_times_out_and_cleans_up() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = TranscriptPipeline::with_providers(
            &stalled_config(Strategy::Tiered),
            Box::new(advertising(&[], &["en"])),
            Box::new(StalledDownload { seen: Arc::clone(&seen) }),
            Box::new(MockTranscriptApi::new()),
        );

        let err = pipeline.fetch(URL).await.unwrap_err();
        assert_eq!(err.to_string(), "Auto subtitles download failed: timed out after 5s");

        let dirs = seen.lock().unwrap();
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].exists());
        assert!(dirs[0].parent().is_some_and(|scratch| !scratch.exists()));
    }

    #[tokio::test]
    async fn test_probe_report_shows_tier_picks() {
        let pipeline = build(
            Strategy::Tiered,
            advertising(&["de"], &["en-US", "tr"]),
            MockCaptionContentProvider::new(),
            MockTranscriptApi::new(),
        );

        let report = pipeline.probe(URL).await.unwrap();
        assert_eq!(report.video_id.as_str(), "abc123");
        assert_eq!(report.manual_pick.as_deref(), Some("de"));
        assert_eq!(report.automatic_pick.as_deref(), Some("tr"));
    }
}
