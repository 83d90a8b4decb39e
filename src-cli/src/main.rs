//! ytgrab - download YouTube videos, playlists and whole channels.
//!
//! This is the command-line shell around `ytgrab-core`.

mod logging;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{Level, error, info};
use ytgrab_core::{
    AppConfig, ErrorKind, LinkDownloader, RESULTS_PER_PAGE, RustyYtdlSource,
    SUPPORTED_RESOLUTIONS, SearchResult, SubscriptionFile, SubscriptionUpdater, UpdateOutcome,
    check_channel_or_playlist_url, format_duration, paginate, parse_resolution, search_videos,
};

use logging::LoggingConfig;

/// Download YouTube videos, playlists and channels
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Download root (defaults to the configured one)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Highest resolution to download: 144, 240, 360, 480, 720 or 1080
    #[arg(long, global = true, value_parser = parse_max_resolution)]
    max_resolution: Option<u32>,

    /// Show debug output on the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Download a channel, playlist or single video
    Download {
        /// Link to download
        url: String,
    },
    /// Report whether a link points to a channel
    Check {
        /// Link to check
        url: String,
    },
    /// Subscribe to a channel
    Subscribe {
        /// Channel link
        url: String,
    },
    /// List subscriptions
    Subscriptions,
    /// Download new content from every subscription
    Update {
        /// Update even if already done today
        #[arg(long)]
        force: bool,
    },
    /// Search for videos
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Page of results to show, three per page
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Show the effective settings
    Config {
        /// Persist them, including --root and --max-resolution
        #[arg(long)]
        save: bool,
    },
}

/// Accepts `720` as well as `720p`.
fn parse_max_resolution(value: &str) -> std::result::Result<u32, String> {
    let resolution = value
        .parse::<u32>()
        .ok()
        .or_else(|| parse_resolution(value))
        .ok_or_else(|| format!("not a resolution: {value}"))?;

    if SUPPORTED_RESOLUTIONS.contains(&resolution) {
        Ok(resolution)
    } else {
        Err(format!(
            "unsupported resolution {resolution}, expected one of {SUPPORTED_RESOLUTIONS:?}"
        ))
    }
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            exit_code(&e)
        }
    }
}

/// Process exit code for a failure, by error category.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let kind = err
        .downcast_ref::<ytgrab_core::Error>()
        .map(ytgrab_core::Error::kind);

    match kind {
        Some(ErrorKind::InvalidUrl) => ExitCode::from(2),
        Some(ErrorKind::Network) => ExitCode::from(3),
        Some(ErrorKind::FileSystem) => ExitCode::from(4),
        Some(ErrorKind::Configuration) => ExitCode::from(5),
        Some(ErrorKind::Unavailable | ErrorKind::Internal) | None => ExitCode::FAILURE,
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LoggingConfig::auto();
    if cli.verbose {
        log_config = log_config.with_console_level(Level::DEBUG);
    }
    let _guard = logging::init(&log_config)?;

    let config = load_config(cli.root.as_deref(), cli.max_resolution)?;
    info!(
        "Download root: {}, max resolution: {}p",
        config.download_root.display(),
        config.max_resolution
    );

    run(cli.command, &config, Local::now().date_naive())
}

/// Load the saved configuration and apply per-invocation overrides.
fn load_config(root: Option<&Path>, max_resolution: Option<u32>) -> Result<AppConfig> {
    let mut config = AppConfig::load().context("Failed to load configuration")?;

    if let Some(root) = root {
        let root = std::path::absolute(root)
            .with_context(|| format!("Invalid download root {}", root.display()))?;
        config.set_download_root(root)?;
    }
    if let Some(max_resolution) = max_resolution {
        config.set_max_resolution(max_resolution)?;
    }

    Ok(config)
}

fn run(command: Command, config: &AppConfig, today: NaiveDate) -> Result<()> {
    match command {
        Command::Download { url } => {
            let downloader = downloader(config)?;
            println!("{}", downloader.download_link(&url, config.max_resolution)?);
        }
        Command::Check { url } => {
            if check_channel_or_playlist_url(&url) {
                println!("Channel url: {url}");
            } else {
                println!("Not a channel url: {url}");
            }
        }
        Command::Subscribe { url } => {
            let file = SubscriptionFile::open_or_create(config.subscription_file_path(), today)?;
            match file.append(&url) {
                Ok(true) => println!("Subscribed to {}", url.trim()),
                Ok(false) => println!("Already subscribed to {}", url.trim()),
                Err(e) if e.is_invalid_url() => bail!("Not a channel url: {}", url.trim()),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Subscriptions => {
            let file = SubscriptionFile::open_or_create(config.subscription_file_path(), today)?;
            let subscriptions = file.read()?;
            match subscriptions.last_checked {
                Some(date) => println!("Last updated: {date}"),
                None => println!("Last updated: never"),
            }
            println!("Subscribed Channels:");
            for url in &subscriptions.urls {
                println!("  {url}");
            }
        }
        Command::Update { force } => {
            let file = SubscriptionFile::open_or_create(config.subscription_file_path(), today)?;
            let downloader = downloader(config)?;
            let updater = SubscriptionUpdater::new(&downloader, file);

            let outcome = if force {
                updater.run_forced(today, config.max_resolution)?
            } else {
                updater.run(today, config.max_resolution)?
            };
            match outcome {
                UpdateOutcome::UpToDate => println!("Subscriptions already updated today"),
                UpdateOutcome::Updated { messages } => {
                    for message in messages {
                        println!("{message}");
                    }
                }
            }
        }
        Command::Search { query, page } => {
            let source = RustyYtdlSource::with_config(config.source.clone())?;
            let results = search_videos(&source, &query.join(" "))?;
            print!("{}", render_search_page(&results, page)?);
        }
        Command::Config { save } => {
            println!("Download root: {}", config.download_root.display());
            println!("Max resolution: {}p", config.max_resolution);
            println!("Subscription file: {}", config.subscription_file_path().display());
            if save {
                config.save()?;
                println!("Saved to {}", AppConfig::config_file_path().display());
            }
        }
    }

    Ok(())
}

/// One page of search results, `page` counted from 1.
fn render_search_page(results: &[SearchResult], page: u32) -> Result<String> {
    let pages = paginate(results, RESULTS_PER_PAGE);
    if pages.is_empty() {
        return Ok("No results\n".to_string());
    }

    let index = usize::try_from(page)?.saturating_sub(1);
    let Some(entries) = pages.get(index) else {
        bail!("No page {page}, the search has {} page(s)", pages.len());
    };

    let mut out = String::new();
    for (n, result) in entries.iter().enumerate() {
        writeln!(out, "{}. {}", index * RESULTS_PER_PAGE + n + 1, result.title)?;
        writeln!(out, "   Created by: {}", result.author)?;
        writeln!(out, "   Length: {}", format_duration(result.duration_secs))?;
        writeln!(out, "   {}", result.url)?;
    }
    writeln!(out, "Page {page} of {}", pages.len())?;

    Ok(out)
}

fn downloader(config: &AppConfig) -> Result<LinkDownloader<RustyYtdlSource>> {
    let source = RustyYtdlSource::with_config(config.source.clone())?;
    Ok(LinkDownloader::new(source, config.layout()))
}
