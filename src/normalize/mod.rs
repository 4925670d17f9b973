//! Timed-subtitle document to plain prose.
//!
//! Caption streams repeat the same text across overlapping cue windows, so after the
//! structural lines are dropped the remaining lines are collapsed against their immediate
//! predecessor. Non-adjacent repeats are kept.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>]*>").expect("markup tag pattern is valid"));

const HEADER: &str = "WEBVTT";
const TIME_SEPARATOR: &str = "-->";
const HEADER_METADATA: [&str; 2] = ["Kind:", "Language:"];

/// Normalize a subtitle document into newline separated text.
///
/// Never fails: lines that match none of the known shapes are treated as cue text, lines
/// that are only structure (header, timing, cue index, markup) are dropped.
pub fn normalize(document: &str) -> String {
    dedupe_adjacent(cue_lines(document)).join("\n").trim().to_string()
}

/// Cleaned cue text lines in document order, before deduplication
pub fn cue_lines(document: &str) -> Vec<String> {
    let document = document.trim_start_matches('\u{feff}');
    let mut lines = Vec::new();
    let mut in_header = false;

    for raw in document.lines() {
        let line = raw.trim();

        if line.is_empty() {
            in_header = false;
            continue;
        }
        if is_header(line) {
            in_header = true;
            continue;
        }
        if in_header && HEADER_METADATA.iter().any(|key| line.starts_with(key)) {
            continue;
        }
        if line.contains(TIME_SEPARATOR) {
            in_header = false;
            continue;
        }
        if line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        if let Some(cleaned) = clean_line(line) {
            lines.push(cleaned);
        }
    }

    lines
}

/// Drop lines identical to the line kept right before them
pub fn dedupe_adjacent(lines: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if kept.last() != Some(&line) {
            kept.push(line);
        }
    }
    kept
}

fn is_header(line: &str) -> bool {
    line == HEADER
        || line
            .strip_prefix(HEADER)
            .is_some_and(|rest| rest.starts_with([' ', '\t']))
}

fn clean_line(line: &str) -> Option<String> {
    let cleaned = if MARKUP_TAG.is_match(line) {
        let stripped = MARKUP_TAG.replace_all(line, "");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        line.to_string()
    };

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
