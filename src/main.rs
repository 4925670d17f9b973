use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subtitle_scribe::cli::{Cli, Commands};
use subtitle_scribe::config::Config;
use subtitle_scribe::pipeline::TranscriptPipeline;
use subtitle_scribe::{extract_video_id, normalize, output, utils, ScribeError};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Fetch {
            url,
            languages,
            strategy,
            timeout,
            output,
            format,
        } => {
            let mut config = Config::load()?;
            config.languages = utils::resolve_languages(&languages, &config.languages);
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            if let Some(timeout) = timeout {
                config.timeout_secs = timeout;
            }
            config.validate()?;

            warn_missing_dependencies(&config).await;

            let pipeline = TranscriptPipeline::new(&config)?;
            tracing::info!("Starting transcript fetch for URL: {}", url);

            let progress = spinner(cli.quiet, "Fetching captions...");
            let result = pipeline.fetch(&url).await;
            progress.finish_and_clear();

            let transcript = result.unwrap_or_else(|err| exit_with(err));

            match output {
                Some(path) => {
                    output::save_to_file(&transcript, &path, &format)?;
                    eprintln!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&transcript, &format)?;
                }
            }
        }
        Commands::Probe { url, languages, format } => {
            let mut config = Config::load()?;
            config.languages = utils::resolve_languages(&languages, &config.languages);
            config.validate()?;

            warn_missing_dependencies(&config).await;

            let pipeline = TranscriptPipeline::new(&config)?;

            let progress = spinner(cli.quiet, "Probing captions...");
            let result = pipeline.probe(&url).await;
            progress.finish_and_clear();

            let report = result.unwrap_or_else(|err| exit_with(err));
            println!("{}", output::format_probe(&report, &format)?);
        }
        Commands::Normalize { file } => {
            let document = fs_err::read_to_string(&file)
                .with_context(|| format!("Error reading subtitle file: {}", file.display()))?;
            println!("{}", normalize(&document));
        }
        Commands::Id { url } => match extract_video_id(&url) {
            Some(video) => println!("{}", video),
            None => exit_with(ScribeError::InvalidUrl),
        },
        Commands::Config { show, path } => {
            if path {
                match Config::config_path() {
                    Some(path) => println!("{}", path.display()),
                    None => anyhow::bail!("Could not determine config directory"),
                }
            }
            if show || !path {
                Config::load()?.display();
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "subtitle_scribe=debug,scribe=debug"
    } else {
        "subtitle_scribe=info,scribe=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn warn_missing_dependencies(config: &Config) {
    let missing_deps = utils::check_dependencies(&config.yt_dlp_path).await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }
}

fn spinner(quiet: bool, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn exit_with(err: ScribeError) -> ! {
    eprintln!("{}", style(err).red());
    std::process::exit(1);
}
