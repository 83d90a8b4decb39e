//! Shared fixtures for the integration tests.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::new_without_default
)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tempfile::TempDir;
use ytgrab_core::{
    ChannelMetadata, DownloadError, DownloadLayout, Error, InvalidUrlError, LinkDownloader,
    PlaylistMetadata, Result, SearchResult, StreamInfo, VideoMetadata, VideoSource, extract_playlist_id,
    extract_video_id, playlist_url, watch_url,
};

/// In-memory [`VideoSource`] whose transfers write small files to disk.
///
/// Channel pages that were never registered answer like a missing channel.
#[derive(Default)]
pub struct FakeSource {
    videos: HashMap<String, Option<VideoMetadata>>,
    playlists: HashMap<String, PlaylistMetadata>,
    channels: HashMap<String, ChannelMetadata>,
    transfers: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an available video with 360p and 720p progressive streams
    /// and a 1080p video-only stream.
    pub fn with_video(mut self, id: &str, title: &str, author: &str) -> Self {
        let stream = |label: &str, has_audio: bool| StreamInfo {
            url: format!("https://media.test/{id}/{label}"),
            quality_label: Some(label.to_string()),
            container: "mp4".to_string(),
            has_audio,
            has_video: true,
        };
        self.videos.insert(
            id.to_string(),
            Some(VideoMetadata {
                video_id: id.to_string(),
                title: title.to_string(),
                author: author.to_string(),
                streams: vec![
                    stream("1080p", false),
                    stream("720p", true),
                    stream("360p", true),
                ],
                age_restricted: false,
            }),
        );
        self
    }

    /// Register a video that is only served to age-verified accounts.
    pub fn with_age_restricted_video(self, id: &str, title: &str, author: &str) -> Self {
        let mut source = self.with_video(id, title, author);
        if let Some(Some(metadata)) = source.videos.get_mut(id) {
            metadata.age_restricted = true;
        }
        source
    }

    /// Register a video the platform refuses to serve.
    pub fn with_unavailable_video(mut self, id: &str) -> Self {
        self.videos.insert(id.to_string(), None);
        self
    }

    pub fn with_playlist(mut self, id: &str, title: &str, video_ids: &[&str]) -> Self {
        self.playlists.insert(
            id.to_string(),
            PlaylistMetadata {
                playlist_id: id.to_string(),
                title: title.to_string(),
                video_urls: video_ids.iter().map(|v| watch_url(v)).collect(),
            },
        );
        self
    }

    pub fn with_channel_page(
        mut self,
        url: &str,
        name: &str,
        video_ids: &[&str],
        page_data: Value,
    ) -> Self {
        self.channels.insert(
            url.to_string(),
            ChannelMetadata {
                name: name.to_string(),
                video_urls: video_ids.iter().map(|v| watch_url(v)).collect(),
                page_data,
            },
        );
        self
    }

    /// Number of streams actually written to disk.
    pub fn transfers(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }
}

impl VideoSource for FakeSource {
    fn resolve_video(&self, url: &str) -> Result<VideoMetadata> {
        let id = extract_video_id(url).ok_or_else(|| InvalidUrlError::Video {
            url: url.to_string(),
        })?;

        match self.videos.get(&id) {
            Some(Some(metadata)) => Ok(metadata.clone()),
            _ => Err(Error::Download(DownloadError::VideoUnavailable {
                video_id: id,
                reason: "Video unavailable".to_string(),
            })),
        }
    }

    fn resolve_playlist(&self, url: &str) -> Result<PlaylistMetadata> {
        extract_playlist_id(url)
            .and_then(|id| self.playlists.get(&id).cloned())
            .ok_or_else(|| {
                Error::Download(DownloadError::PageParseFailed {
                    url: url.to_string(),
                    reason: "Unknown playlist".to_string(),
                })
            })
    }

    fn resolve_channel(&self, url: &str) -> Result<ChannelMetadata> {
        self.channels.get(url).cloned().ok_or_else(|| {
            InvalidUrlError::Channel {
                url: url.to_string(),
            }
            .into()
        })
    }

    /// Available videos whose title contains the query, ordered by id.
    fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.to_lowercase();
        let mut results: Vec<SearchResult> = self
            .videos
            .values()
            .flatten()
            .filter(|video| video.title.to_lowercase().contains(&query))
            .map(|video| SearchResult {
                video_id: video.video_id.clone(),
                title: video.title.clone(),
                author: video.author.clone(),
                url: watch_url(&video.video_id),
                duration_secs: Some(200),
            })
            .collect();
        results.sort_by(|a, b| a.video_id.cmp(&b.video_id));
        Ok(results)
    }

    fn fetch_stream(
        &self,
        stream: &StreamInfo,
        destination_dir: &Path,
        filename: &str,
        skip_if_exists: bool,
    ) -> Result<PathBuf> {
        let path = destination_dir.join(filename);
        if skip_if_exists && path.exists() {
            return Ok(path);
        }

        fs::create_dir_all(destination_dir)?;
        fs::write(&path, &stream.url)?;
        self.transfers.fetch_add(1, Ordering::SeqCst);
        Ok(path)
    }
}

/// A download root in a temporary directory.
pub struct TestFixture {
    pub root: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Should create temp dir"),
        }
    }

    pub fn layout(&self) -> DownloadLayout {
        DownloadLayout::new(self.root.path())
    }

    pub fn downloader(&self, source: FakeSource) -> LinkDownloader<FakeSource> {
        LinkDownloader::new(source, self.layout())
    }

    /// Lines of a playlist manifest.
    pub fn manifest_lines(&self, playlist_title: &str) -> Vec<String> {
        fs::read_to_string(self.layout().manifest_path(playlist_title))
            .expect("Manifest should exist")
            .lines()
            .map(String::from)
            .collect()
    }

    /// Number of regular files directly under `dir`.
    pub fn file_count(&self, dir: &Path) -> usize {
        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(std::result::Result::ok)
                    .filter(|e| e.path().is_file())
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Canonical playlist URL for an id.
pub fn list(id: &str) -> String {
    playlist_url(id)
}
