//! The remote video source.
//!
//! Everything that talks to the platform goes through [`VideoSource`]: page
//! scraping, stream metadata and the byte transfer itself. The download
//! orchestration in [`video`](crate::video), [`playlist`](crate::playlist) and
//! [`channel`](crate::channel) only ever sees this trait, which keeps it
//! testable without network access.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resolution::parse_resolution;

pub mod ytdl;

pub use ytdl::{RustyYtdlSource, SourceConfig};

/// One encoded stream of a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Direct media URL.
    pub url: String,
    /// Quality label such as `720p`, absent for audio-only streams.
    pub quality_label: Option<String>,
    /// Container format (`mp4`, `webm`, ...).
    pub container: String,
    /// Whether the stream carries audio.
    pub has_audio: bool,
    /// Whether the stream carries video.
    pub has_video: bool,
}

impl StreamInfo {
    /// Audio and video in a single file.
    #[must_use]
    pub const fn is_progressive(&self) -> bool {
        self.has_audio && self.has_video
    }

    /// Numeric resolution parsed from the quality label.
    #[must_use]
    pub fn resolution(&self) -> Option<u32> {
        self.quality_label.as_deref().and_then(parse_resolution)
    }
}

/// Metadata for a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video identifier.
    pub video_id: String,
    /// Title as reported by the platform.
    pub title: String,
    /// Channel name as reported by the platform.
    pub author: String,
    /// Available streams, in platform order.
    pub streams: Vec<StreamInfo>,
    /// Whether the platform gates this video behind age verification.
    pub age_restricted: bool,
}

/// Metadata for a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMetadata {
    /// Playlist identifier.
    pub playlist_id: String,
    /// Title as reported by the platform.
    pub title: String,
    /// Watch URLs of the playlist entries, in playlist order.
    pub video_urls: Vec<String>,
}

/// Metadata scraped from one channel page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    /// Channel display name.
    pub name: String,
    /// Watch URLs of the videos listed on the page.
    pub video_urls: Vec<String>,
    /// The page's embedded data, an arbitrarily nested tree.
    pub page_data: serde_json::Value,
}

/// One video found by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Video identifier.
    pub video_id: String,
    /// Title as displayed in the results.
    pub title: String,
    /// Channel name.
    pub author: String,
    /// Watch URL, ready for [`download_link`](crate::LinkDownloader::download_link).
    pub url: String,
    /// Length in seconds, absent for live streams.
    pub duration_secs: Option<u64>,
}

/// Remote source of video, playlist and channel metadata.
#[cfg_attr(test, mockall::automock)]
pub trait VideoSource: Send + Sync {
    /// Resolve a video URL.
    ///
    /// # Errors
    ///
    /// [`InvalidUrlError::Video`](crate::error::InvalidUrlError::Video) when no
    /// video identifier can be parsed,
    /// [`DownloadError::VideoUnavailable`](crate::error::DownloadError::VideoUnavailable)
    /// when the video is private, deleted or blocked,
    /// [`DownloadError::AgeRestricted`](crate::error::DownloadError::AgeRestricted)
    /// when it is gated behind a signed-in account. Transport and parse
    /// failures propagate as other errors.
    fn resolve_video(&self, url: &str) -> Result<VideoMetadata>;

    /// Resolve a playlist URL to its title and entries.
    fn resolve_playlist(&self, url: &str) -> Result<PlaylistMetadata>;

    /// Scrape a channel page.
    fn resolve_channel(&self, url: &str) -> Result<ChannelMetadata>;

    /// Search for videos, in the platform's relevance order.
    fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Transfer a stream to `destination_dir/filename`, creating the directory
    /// if needed. With `skip_if_exists` an existing file is left untouched.
    ///
    /// Returns the path of the file on disk.
    fn fetch_stream(
        &self,
        stream: &StreamInfo,
        destination_dir: &Path,
        filename: &str,
        skip_if_exists: bool,
    ) -> Result<PathBuf>;
}
