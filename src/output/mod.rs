use anyhow::Result;
use serde_json::json;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::{ProbeReport, Transcript};

/// Render a transcript in the requested format
pub fn format_transcript(transcript: &Transcript, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => transcript.text.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "video_id": transcript.video_id,
            "language": transcript.language,
            "kind": transcript.kind,
            "source": transcript.source,
            "text": transcript.text,
            "line_count": transcript.line_count(),
            "fetched_at": transcript.fetched_at,
        }))?,
    };
    Ok(content)
}

/// Render a probe report in the requested format
pub fn format_probe(report: &ProbeReport, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => {
            let list = |langs: &[String]| {
                if langs.is_empty() {
                    "(none)".to_string()
                } else {
                    langs.join(", ")
                }
            };
            let pick = |lang: &Option<String>| lang.clone().unwrap_or_else(|| "-".to_string());

            format!(
                "Video: {}\nManual captions: {}\n  would use: {}\nAutomatic captions: {}\n  would use: {}",
                report.video_id,
                list(&report.availability.manual),
                pick(&report.manual_pick),
                list(&report.availability.automatic),
                pick(&report.automatic_pick),
            )
        }
    };
    Ok(content)
}

/// Save transcript to file
pub fn save_to_file(transcript: &Transcript, path: &Path, format: &OutputFormat) -> Result<()> {
    let mut content = format_transcript(transcript, format)?;
    content.push('\n');
    fs_err::write(path, content)?;
    Ok(())
}

/// Print transcript to console
pub fn print_to_console(transcript: &Transcript, format: &OutputFormat) -> Result<()> {
    println!("{}", format_transcript(transcript, format)?);
    Ok(())
}
