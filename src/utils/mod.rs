use crate::language::parse_language_list;

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for caption probing and subtitle download", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Merge `--lang` flags (each possibly comma separated) over configured languages
pub fn resolve_languages(flags: &[String], configured: &[String]) -> Vec<String> {
    let from_flags: Vec<String> = flags.iter().flat_map(|flag| parse_language_list(flag)).collect();

    let mut resolved: Vec<String> = Vec::new();
    for lang in if from_flags.is_empty() { configured.to_vec() } else { from_flags } {
        if !resolved.contains(&lang) {
            resolved.push(lang);
        }
    }
    resolved
}
