//! Subscriptions: channels and playlists re-downloaded once a day.
//!
//! The subscription file is plain text. Line 0 holds the date of the last
//! update (`YYYY-MM-DD`), every following line one subscribed URL.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::dispatch::LinkDownloader;
use crate::error::{FileSystemError, InvalidUrlError, Result};
use crate::source::VideoSource;
use crate::url::check_channel_or_playlist_url;

/// Format of the date line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parsed contents of a subscription file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscriptions {
    /// Date of the last update, `None` if the line is missing or unreadable.
    pub last_checked: Option<NaiveDate>,
    /// Subscribed URLs, in file order.
    pub urls: Vec<String>,
}

/// Handle to the subscription file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionFile {
    path: PathBuf,
}

impl SubscriptionFile {
    /// Open the file at `path`, creating it (and its parent directories) with
    /// only a date line for `today` if it does not exist.
    pub fn open_or_create(path: impl Into<PathBuf>, today: NaiveDate) -> Result<Self> {
        let file = Self { path: path.into() };

        if !file.path.exists() {
            if let Some(parent) = file.path.parent() {
                fs::create_dir_all(parent).map_err(|e| FileSystemError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
            info!("Creating subscription file {}", file.path.display());
            file.write(&Subscriptions {
                last_checked: Some(today),
                urls: Vec::new(),
            })?;
        }

        Ok(file)
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the date line and the subscribed URLs.
    pub fn read(&self) -> Result<Subscriptions> {
        let contents = fs::read_to_string(&self.path).map_err(|e| FileSystemError::ReadFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let mut lines = contents.lines();
        let last_checked = lines
            .next()
            .and_then(|line| NaiveDate::parse_from_str(line.trim(), DATE_FORMAT).ok());
        let urls = lines
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(Subscriptions { last_checked, urls })
    }

    /// Subscribe to `url`.
    ///
    /// Returns `false` if the URL was already subscribed.
    ///
    /// # Errors
    ///
    /// [`InvalidUrlError::Channel`] when `url` is not a channel link.
    pub fn append(&self, url: &str) -> Result<bool> {
        let url = url.trim();
        if !check_channel_or_playlist_url(url) {
            return Err(InvalidUrlError::Channel {
                url: url.to_string(),
            }
            .into());
        }

        let mut subscriptions = self.read()?;
        if subscriptions.urls.iter().any(|u| u == url) {
            debug!("Already subscribed to {}", url);
            return Ok(false);
        }

        subscriptions.urls.push(url.to_string());
        self.write(&subscriptions)?;
        info!("Subscribed to {}", url);
        Ok(true)
    }

    /// Record `today` as the date of the last update.
    pub fn mark_checked(&self, today: NaiveDate) -> Result<()> {
        let mut subscriptions = self.read()?;
        subscriptions.last_checked = Some(today);
        self.write(&subscriptions)
    }

    fn write(&self, subscriptions: &Subscriptions) -> Result<()> {
        let mut contents = subscriptions
            .last_checked
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        contents.push('\n');
        for url in &subscriptions.urls {
            contents.push_str(url);
            contents.push('\n');
        }

        fs::write(&self.path, contents).map_err(|e| {
            FileSystemError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Result of an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Already updated today, nothing downloaded.
    UpToDate,
    /// Every subscription was processed.
    Updated {
        /// One status line per subscribed URL.
        messages: Vec<String>,
    },
}

/// Downloads every subscription when the last update is older than today.
#[derive(Debug)]
pub struct SubscriptionUpdater<'a, S> {
    downloader: &'a LinkDownloader<S>,
    file: SubscriptionFile,
}

impl<'a, S: VideoSource> SubscriptionUpdater<'a, S> {
    /// Create an updater for `file`.
    pub const fn new(downloader: &'a LinkDownloader<S>, file: SubscriptionFile) -> Self {
        Self { downloader, file }
    }

    /// The subscription file being updated.
    pub const fn file(&self) -> &SubscriptionFile {
        &self.file
    }

    /// Update unless already done today.
    pub fn run(&self, today: NaiveDate, max_resolution: u32) -> Result<UpdateOutcome> {
        let subscriptions = self.file.read()?;
        if subscriptions.last_checked == Some(today) {
            info!("Subscriptions already updated on {}", today);
            return Ok(UpdateOutcome::UpToDate);
        }
        self.update(&subscriptions.urls, today, max_resolution)
    }

    /// Update regardless of the date line.
    pub fn run_forced(&self, today: NaiveDate, max_resolution: u32) -> Result<UpdateOutcome> {
        let subscriptions = self.file.read()?;
        self.update(&subscriptions.urls, today, max_resolution)
    }

    fn update(&self, urls: &[String], today: NaiveDate, max_resolution: u32) -> Result<UpdateOutcome> {
        info!("Fetching updates for {} subscriptions", urls.len());

        let messages = urls
            .iter()
            .map(|url| match self.downloader.download_link(url, max_resolution) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Failed to update {}: {}", url, e);
                    format!("Failed to update {url}: {e}")
                }
            })
            .collect();

        self.file.mark_checked(today)?;
        Ok(UpdateOutcome::Updated { messages })
    }
}
