use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How captions are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Probe with yt-dlp, then download manual and automatic tracks in turn
    #[default]
    Tiered,
    /// Ask the transcript API for the preference list directly
    Direct,
    /// Try the transcript API, fall back to the tiered download
    DirectThenTiered,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Tiered => write!(f, "tiered"),
            Strategy::Direct => write!(f, "direct"),
            Strategy::DirectThenTiered => write!(f, "direct-then-tiered"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred caption languages, most wanted first
    pub languages: Vec<String>,

    /// Retrieval strategy
    pub strategy: Strategy,

    /// Timeout applied to every external call, in seconds
    pub timeout_secs: u64,

    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// Parent directory for per-request scratch directories
    pub temp_dir: Option<PathBuf>,

    /// User agent for HTTP requests
    pub user_agent: String,

    /// Player API settings
    pub innertube: InnertubeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InnertubeConfig {
    pub base_url: String,
    pub client_version: String,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: vec!["tr".to_string(), "en".to_string()],
            strategy: Strategy::Tiered,
            timeout_secs: 60,
            yt_dlp_path: "yt-dlp".to_string(),
            temp_dir: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            innertube: InnertubeConfig::default(),
        }
    }
}

impl Default for InnertubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            client_version: "2.20250626.01.00".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from file, or fall back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a specific configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Get configuration file path
    pub fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("scribe.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("subtitle-scribe").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.languages.iter().all(|lang| lang.trim().is_empty()) {
            anyhow::bail!("At least one preferred language must be configured");
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Languages: {}", self.languages.join(", "));
        println!("  Strategy: {}", self.strategy);
        println!("  Timeout: {}s", self.timeout_secs);
        println!("  yt-dlp: {}", self.yt_dlp_path);
        if let Some(dir) = &self.temp_dir {
            println!("  Temp Dir: {}", dir.display());
        }
        println!("  Player API: {}", self.innertube.base_url);
    }
}
