//! Link classification and the top-level `download_link` entry point.
//!
//! A link is tried as a channel, then a playlist, then a single video. The
//! first kind that constructs wins; only an invalid-URL error for the kind
//! being tried moves on to the next one.

use tracing::{debug, info};

use crate::channel::ChannelRef;
use crate::error::{Error, ErrorKind, InvalidUrlError, Result};
use crate::layout::DownloadLayout;
use crate::playlist::PlaylistRef;
use crate::source::VideoSource;
use crate::video::VideoRef;

pub use crate::url::check_channel_or_playlist_url;

/// What a link turned out to be.
#[derive(Debug)]
pub enum LinkKind<'a> {
    /// A channel page.
    Channel(ChannelRef<'a>),
    /// A playlist.
    Playlist(PlaylistRef<'a>),
    /// A single available video.
    Video(VideoRef<'a>),
    /// A well-formed video link the platform will not serve.
    Unavailable,
    /// Not a channel, playlist or video link.
    Invalid,
}

impl LinkKind<'_> {
    /// Status line reported for `url` once this link has been handled.
    #[must_use]
    pub fn status_message(&self, url: &str) -> String {
        match self {
            Self::Channel(_) => format!("Valid Channel url: {url}"),
            Self::Playlist(_) => format!("Valid Playlist url: {url}"),
            Self::Video(_) => format!("Valid Video: {url}"),
            Self::Unavailable => format!("Unavailable Video: {url}"),
            Self::Invalid => format!("Invalid Channel/Playlist/Video url: {url}"),
        }
    }
}

/// Classify `url`.
///
/// # Errors
///
/// Only errors outside the invalid-URL and unavailable family, such as
/// network or page parse failures.
pub fn classify<'a>(
    source: &'a dyn VideoSource,
    layout: &DownloadLayout,
    url: &str,
) -> Result<LinkKind<'a>> {
    match ChannelRef::new(source, layout, url) {
        Ok(channel) => return Ok(LinkKind::Channel(channel)),
        Err(Error::InvalidUrl(InvalidUrlError::Channel { .. })) => {
            debug!("{} is not a channel", url);
        }
        Err(e) => return Err(e),
    }

    match PlaylistRef::new(source, layout, url) {
        Ok(playlist) => return Ok(LinkKind::Playlist(playlist)),
        Err(Error::InvalidUrl(InvalidUrlError::Playlist { .. })) => {
            debug!("{} is not a playlist", url);
        }
        Err(e) => return Err(e),
    }

    match VideoRef::new(source, layout, url) {
        Ok(video) => Ok(LinkKind::Video(video)),
        Err(e) if e.kind() == ErrorKind::Unavailable => Ok(LinkKind::Unavailable),
        Err(Error::InvalidUrl(InvalidUrlError::Video { .. })) => Ok(LinkKind::Invalid),
        Err(e) => Err(e),
    }
}

/// Downloads arbitrary links into a download root.
#[derive(Debug)]
pub struct LinkDownloader<S> {
    source: S,
    layout: DownloadLayout,
}

impl<S: VideoSource> LinkDownloader<S> {
    /// Create a downloader writing under `layout`.
    pub const fn new(source: S, layout: DownloadLayout) -> Self {
        Self { source, layout }
    }

    /// The video source in use.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The download layout in use.
    pub const fn layout(&self) -> &DownloadLayout {
        &self.layout
    }

    /// Classify `url` without downloading anything.
    pub fn classify(&self, url: &str) -> Result<LinkKind<'_>> {
        classify(&self.source, &self.layout, url.trim())
    }

    /// Classify `url`, download whatever it points to and report the outcome.
    ///
    /// Surrounding whitespace is trimmed first; the message echoes the
    /// trimmed URL.
    ///
    /// # Errors
    ///
    /// Failures other than an invalid or unavailable link, for example a
    /// network error midway through a playlist.
    pub fn download_link(&self, url: &str, max_resolution: u32) -> Result<String> {
        let url = url.trim();
        let kind = classify(&self.source, &self.layout, url)?;

        match &kind {
            LinkKind::Channel(channel) => {
                let summary = channel.download_channel(max_resolution)?;
                info!(
                    "Channel {} done: {} videos, {} playlists",
                    channel.name(),
                    summary.videos.len(),
                    summary.manifests.len()
                );
            }
            LinkKind::Playlist(playlist) => {
                playlist.download(max_resolution)?;
            }
            LinkKind::Video(video) => {
                video.download(max_resolution)?;
            }
            LinkKind::Unavailable | LinkKind::Invalid => {}
        }

        let message = kind.status_message(url);
        info!("{}", message);
        Ok(message)
    }
}
