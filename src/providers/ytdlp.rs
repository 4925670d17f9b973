use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use super::{CaptionAvailability, CaptionContentProvider, CaptionMetadataProvider, CaptionTrackKind};
use crate::extractors::VideoId;
use crate::Result;

/// Subtitle track keys yt-dlp reports that are not captions
const NON_CAPTION_TRACKS: [&str; 1] = ["live_chat"];

/// Caption prober and subtitle downloader backed by the yt-dlp executable
pub struct YtDlp {
    yt_dlp_path: String,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(yt_dlp_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            timeout,
        }
    }

    /// Run yt-dlp with `args`, killing it once the timeout elapses
    async fn run(&self, args: &[String]) -> Result<Output> {
        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        let child = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| anyhow::anyhow!("yt-dlp timed out after {}s", self.timeout.as_secs()))?
            .with_context(|| format!("Failed to run {}", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        Ok(output)
    }
}

/// Read caption languages out of a `--dump-json` document
pub fn parse_availability(info: &Value) -> CaptionAvailability {
    let languages = |key: &str| -> Vec<String> {
        info.get(key)
            .and_then(Value::as_object)
            .map(|tracks| {
                tracks
                    .iter()
                    .filter(|(lang, formats)| {
                        !NON_CAPTION_TRACKS.contains(&lang.as_str())
                            && formats.as_array().map_or(true, |f| !f.is_empty())
                    })
                    .map(|(lang, _)| lang.clone())
                    .collect()
            })
            .unwrap_or_default()
    };

    CaptionAvailability {
        manual: languages("subtitles"),
        automatic: languages("automatic_captions"),
    }
}

/// Arguments for a subtitle-only download of one track kind
pub fn download_args(
    video: &VideoId,
    languages: &[String],
    kind: CaptionTrackKind,
    destination: &Path,
) -> Vec<String> {
    let write_flag = match kind {
        CaptionTrackKind::Manual => "--write-subs",
        CaptionTrackKind::Automatic => "--write-auto-subs",
    };

    vec![
        "--skip-download".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        write_flag.to_string(),
        "--sub-langs".to_string(),
        languages.join(","),
        "--sub-format".to_string(),
        "vtt".to_string(),
        "--output".to_string(),
        destination.join("%(id)s.%(ext)s").to_string_lossy().into_owned(),
        video.watch_url(),
    ]
}

/// Subtitle files present in `dir`, sorted by path
pub fn collect_subtitle_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("vtt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[async_trait]
impl CaptionMetadataProvider for YtDlp {
    async fn probe(&self, video: &VideoId) -> Result<CaptionAvailability> {
        tracing::debug!("Probing captions for: {}", video);

        let args = [
            "--dump-json".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            video.watch_url(),
        ];
        let output = self.run(&args).await?;

        let json_str = String::from_utf8(output.stdout).context("yt-dlp printed invalid UTF-8")?;
        let info: Value = serde_json::from_str(&json_str).context("Failed to parse yt-dlp metadata")?;

        Ok(parse_availability(&info))
    }
}

#[async_trait]
impl CaptionContentProvider for YtDlp {
    async fn download(
        &self,
        video: &VideoId,
        languages: &[String],
        kind: CaptionTrackKind,
        destination: &Path,
    ) -> Result<Vec<PathBuf>> {
        tracing::debug!("Downloading {} subtitles [{}] for: {}", kind, languages.join(","), video);

        self.run(&download_args(video, languages, kind, destination)).await?;

        collect_subtitle_files(destination)
    }
}
