//! Channel downloads: the channel's own uploads plus every playlist linked
//! from its pages.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, InvalidUrlError, Result};
use crate::layout::DownloadLayout;
use crate::page_data::find_unique_strings;
use crate::playlist::PlaylistRef;
use crate::source::VideoSource;
use crate::url::{WATCH_LATER_URL, channel_base_url, playlist_url};
use crate::video::VideoRef;

/// Key under which channel pages reference playlists.
const PLAYLIST_ID_KEY: &str = "playlistId";

/// Results of a full channel download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelDownloadSummary {
    /// Result string of every uploaded video, in listing order.
    pub videos: Vec<String>,
    /// Manifest path of every downloaded playlist.
    pub manifests: Vec<PathBuf>,
}

/// A resolved channel: its uploads and the playlists discovered on its pages.
pub struct ChannelRef<'a> {
    source: &'a dyn VideoSource,
    layout: DownloadLayout,
    url: String,
    base_url: String,
    name: String,
    videos: Vec<VideoRef<'a>>,
    playlist_urls: Vec<String>,
}

impl fmt::Debug for ChannelRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRef")
            .field("url", &self.url)
            .field("base_url", &self.base_url)
            .field("name", &self.name)
            .field("videos", &self.videos)
            .field("playlist_urls", &self.playlist_urls)
            .finish_non_exhaustive()
    }
}

impl<'a> ChannelRef<'a> {
    /// Resolve `url` into a channel.
    ///
    /// Uploads come from the channel's `videos/` page; unavailable ones are
    /// skipped. Playlists are gathered from the base, `videos/`,
    /// `playlists/` and `releases/` pages and the original URL. A page that
    /// cannot be fetched contributes nothing.
    ///
    /// # Errors
    ///
    /// [`InvalidUrlError::Channel`] when the URL has no channel name or the
    /// uploads page does not exist. Other errors from the uploads page
    /// propagate.
    pub fn new(source: &'a dyn VideoSource, layout: &DownloadLayout, url: &str) -> Result<Self> {
        let base_url = channel_base_url(url).ok_or_else(|| InvalidUrlError::Channel {
            url: url.to_string(),
        })?;
        info!("Channel base: {}", base_url);

        let uploads_url = format!("{base_url}videos/");
        let uploads = source.resolve_channel(&uploads_url)?;

        let mut videos = Vec::with_capacity(uploads.video_urls.len());
        for video_url in &uploads.video_urls {
            match VideoRef::new(source, layout, video_url) {
                Ok(video) => videos.push(video),
                Err(e) if e.kind() == ErrorKind::Unavailable => {
                    warn!("Video from {} is unavailable, skipping: {}", video_url, e);
                }
                Err(e) => return Err(e),
            }
        }

        let mut playlist_urls: Vec<String> = Vec::new();
        for page in channel_pages(&base_url, url) {
            let fetched;
            let page_data = if page == uploads_url {
                &uploads.page_data
            } else {
                match source.resolve_channel(&page) {
                    Ok(metadata) => {
                        fetched = metadata.page_data;
                        &fetched
                    }
                    Err(e) => {
                        warn!("{} not found: {}", page, e);
                        continue;
                    }
                }
            };

            let found = discover_playlist_urls(page_data);
            debug!("{} found playlist(s): {:?}", page, found);

            for found_url in found {
                if playlist_urls.contains(&found_url) {
                    debug!("Found duplicate playlist url (skipped): {}", found_url);
                } else {
                    playlist_urls.push(found_url);
                }
            }
        }
        info!(
            "Channel {}: {} videos, {} playlists",
            uploads.name,
            videos.len(),
            playlist_urls.len()
        );

        Ok(Self {
            source,
            layout: layout.clone(),
            url: url.to_string(),
            base_url,
            name: uploads.name,
            videos,
            playlist_urls,
        })
    }

    /// The URL this channel was created from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Canonical `https://www.youtube.com/<name>/` URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Channel display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The channel's available uploads.
    #[must_use]
    pub fn videos(&self) -> &[VideoRef<'a>] {
        &self.videos
    }

    /// Discovered playlist URLs, without duplicates or Watch Later.
    #[must_use]
    pub fn playlist_urls(&self) -> &[String] {
        &self.playlist_urls
    }

    /// Download every upload, returning each video's result string.
    pub fn download_channel_videos(&self, max_resolution: u32) -> Result<Vec<String>> {
        self.videos
            .iter()
            .map(|video| video.download(max_resolution))
            .collect()
    }

    /// Download every discovered playlist, returning the manifest paths.
    ///
    /// URLs that turn out not to be playlists are logged and skipped.
    pub fn download_channel_playlists(&self, max_resolution: u32) -> Result<Vec<PathBuf>> {
        let mut manifests = Vec::new();

        for url in &self.playlist_urls {
            match PlaylistRef::new(self.source, &self.layout, url) {
                Ok(playlist) => {
                    info!("Valid Playlist: {}", url);
                    manifests.push(playlist.download(max_resolution)?);
                }
                Err(e) if e.is_invalid_url() => warn!("Invalid Playlist: {}", url),
                Err(e) => return Err(e),
            }
        }

        Ok(manifests)
    }

    /// Download the uploads, then the playlists.
    pub fn download_channel(&self, max_resolution: u32) -> Result<ChannelDownloadSummary> {
        let videos = self.download_channel_videos(max_resolution)?;
        let manifests = self.download_channel_playlists(max_resolution)?;
        Ok(ChannelDownloadSummary { videos, manifests })
    }
}

/// Pages scanned for playlists, deduplicated, in scan order.
fn channel_pages(base_url: &str, original_url: &str) -> Vec<String> {
    let mut pages: Vec<String> = Vec::with_capacity(5);
    for page in [
        base_url.to_string(),
        format!("{base_url}videos/"),
        format!("{base_url}playlists/"),
        format!("{base_url}releases/"),
        original_url.to_string(),
    ] {
        if !pages.contains(&page) {
            pages.push(page);
        }
    }
    pages
}

/// Playlist URLs referenced anywhere in a page's data, Watch Later excluded.
#[must_use]
pub fn discover_playlist_urls(page_data: &Value) -> Vec<String> {
    find_unique_strings(page_data, PLAYLIST_ID_KEY)
        .iter()
        .map(|id| playlist_url(id))
        .filter(|url| url != WATCH_LATER_URL)
        .collect()
}
