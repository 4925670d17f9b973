//! Picks one subtitle file when a download produced several.

use std::path::{Path, PathBuf};

/// Unranked candidates sort after every known language
pub const UNRANKED: u32 = 999;

/// Rank a subtitle file by the language marker in its name; lower is better
pub fn rank_candidate(path: &Path) -> u32 {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    if name.contains(".tr.") {
        0
    } else if name.contains(".en-GB.") {
        2
    } else if name.contains(".en.") {
        1
    } else {
        UNRANKED
    }
}

/// Lowest ranked candidate, ties broken by path order
pub fn select_candidate(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates
        .iter()
        .min_by(|a, b| rank_candidate(a).cmp(&rank_candidate(b)).then_with(|| a.cmp(b)))
}
