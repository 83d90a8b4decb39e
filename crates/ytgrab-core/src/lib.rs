//! `ytgrab` Core Library
//!
//! This crate provides the core functionality for the `ytgrab` downloader:
//! - Link classification (channel, playlist, single video)
//! - Video downloads with a resolution cap
//! - Playlist downloads with deduplicating manifests
//! - Channel downloads covering uploads and every linked playlist
//! - Daily subscription updates
//! - Video search with paged results
//! - Application configuration management
//!
//! All remote access goes through the [`VideoSource`] trait;
//! [`RustyYtdlSource`] is the production implementation.
//!
//! # Error Handling
//!
//! Errors are typed per domain. See the [`error`] module for details.
//!
//! ```rust,no_run
//! use ytgrab_core::{DownloadLayout, LinkDownloader, RustyYtdlSource};
//!
//! fn grab(url: &str) -> ytgrab_core::Result<String> {
//!     let downloader = LinkDownloader::new(
//!         RustyYtdlSource::new()?,
//!         DownloadLayout::new("/tmp/YouTube-Downloads"),
//!     );
//!     downloader.download_link(url, 720)
//! }
//! ```

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod layout;
pub mod page_data;
pub mod playlist;
pub mod resolution;
pub mod sanitize;
pub mod search;
pub mod source;
pub mod subscription;
pub mod url;
pub mod video;

pub use channel::{ChannelDownloadSummary, ChannelRef, discover_playlist_urls};
pub use config::{AppConfig, DEFAULT_SUBSCRIPTION_FILE, default_download_root};
pub use dispatch::{LinkDownloader, LinkKind, classify};
pub use error::{
    DownloadError, Error, ErrorKind, FileSystemError, InvalidUrlError, Result,
};
pub use layout::{DownloadLayout, MANIFEST_EXTENSION, PLAYLISTS_DIR, UNKNOWN_AUTHOR, author_segment};
pub use page_data::{FindValues, extract_yt_initial_data, find_unique_strings, find_values};
pub use playlist::{PlaylistRef, read_manifest, write_manifest};
pub use resolution::{
    DEFAULT_MAX_RESOLUTION, SUPPORTED_RESOLUTIONS, TARGET_CONTAINER, parse_resolution,
    progressive_streams, select_stream,
};
pub use sanitize::{sanitize, sanitize_file_name};
pub use search::{
    RESULTS_PER_PAGE, format_duration, paginate, parse_duration_text, search_videos,
    split_duration,
};
pub use source::{
    ChannelMetadata, PlaylistMetadata, RustyYtdlSource, SearchResult, SourceConfig, StreamInfo,
    VideoMetadata, VideoSource,
};
pub use subscription::{
    DATE_FORMAT, SubscriptionFile, SubscriptionUpdater, Subscriptions, UpdateOutcome,
};
pub use url::{
    WATCH_LATER_URL, channel_base_url, channel_name, check_channel_or_playlist_url,
    extract_playlist_id, extract_video_id, has_playlist_marker, playlist_url, watch_url,
};
pub use video::{AGE_RESTRICTED_SUFFIX, VideoRef};
