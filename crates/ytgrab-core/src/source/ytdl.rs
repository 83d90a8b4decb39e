//! Production [`VideoSource`] built on `rusty_ytdl` and page scraping.
//!
//! # Pure Rust Implementation
//!
//! Video metadata and stream lists come from `rusty_ytdl`, which is a pure
//! Rust extractor; no yt-dlp or ffmpeg is needed. Playlist and channel
//! listings are scraped from the `ytInitialData` blob embedded in the pages,
//! and the stream bytes are transferred with a blocking `reqwest` client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ytgrab_core::source::{RustyYtdlSource, VideoSource};
//!
//! let source = RustyYtdlSource::new().unwrap();
//! let video = source.resolve_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
//! println!("{} by {} ({} streams)", video.title, video.author, video.streams.len());
//! ```

use std::fs::{self, File};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use rusty_ytdl::{Video, VideoError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{
    ChannelMetadata, PlaylistMetadata, SearchResult, StreamInfo, VideoMetadata, VideoSource,
};
use crate::error::{DownloadError, Error, FileSystemError, InvalidUrlError, Result};
use crate::page_data::{extract_yt_initial_data, find_values, html_decode};
use crate::search::parse_duration_text;
use crate::url::{extract_playlist_id, extract_video_id, playlist_url, watch_url};

/// Search results page.
const SEARCH_URL: &str = "https://www.youtube.com/results";

/// Default browser user agent sent with page requests.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Network settings for [`RustyYtdlSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// User agent for page and stream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// `YouTube` source backed by `rusty_ytdl` and a blocking HTTP client.
pub struct RustyYtdlSource {
    config: SourceConfig,
    client: Client,
}

impl RustyYtdlSource {
    /// Create a source with default network settings.
    pub fn new() -> Result<Self> {
        Self::with_config(SourceConfig::default())
    }

    /// Create a source with custom network settings.
    pub fn with_config(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// The network settings in use.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Issue a GET request for a page.
    fn get(&self, url: &str) -> Result<Response> {
        debug!("Fetching page: {}", url);
        self.client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .map_err(|e| {
                Error::Download(DownloadError::PageParseFailed {
                    url: url.to_string(),
                    reason: format!("Failed to fetch page: {e}"),
                })
            })
    }

    /// Read a successful response body as text.
    fn read_html(response: Response, url: &str) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(DownloadError::PageParseFailed {
                url: url.to_string(),
                reason: format!("Unexpected status {status}"),
            }));
        }

        response.text().map_err(|e| {
            Error::Download(DownloadError::PageParseFailed {
                url: url.to_string(),
                reason: format!("Failed to read response: {e}"),
            })
        })
    }

    /// Async implementation of `resolve_video`.
    async fn resolve_video_async(url: String, video_id: String) -> Result<VideoMetadata> {
        let video_url = watch_url(&video_id);

        let video = Video::new(&video_url).map_err(|e| {
            debug!("rusty_ytdl rejected {}: {}", video_url, e);
            Error::InvalidUrl(InvalidUrlError::Video { url: url.clone() })
        })?;

        let info = video
            .get_info()
            .await
            .map_err(|e| info_error(&video_id, &video_url, &e))?;

        debug!("Available formats for {}: {}", video_id, info.formats.len());

        let streams = info
            .formats
            .iter()
            .map(|format| StreamInfo {
                url: format.url.clone(),
                quality_label: format.quality_label.clone(),
                container: format.mime_type.container.clone(),
                has_audio: format.has_audio,
                has_video: format.has_video,
            })
            .collect();

        let details = &info.video_details;
        Ok(VideoMetadata {
            video_id: details.video_id.clone(),
            title: details.title.clone(),
            author: details
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            streams,
            age_restricted: details.age_restricted,
        })
    }

    /// Extract playlist title from page data or HTML.
    fn extract_playlist_title(data: &Value, html: &str) -> Option<String> {
        if let Some(title) = data
            .get("metadata")
            .and_then(|m| m.get("playlistMetadataRenderer"))
            .and_then(|r| r.get("title"))
            .and_then(Value::as_str)
        {
            return Some(title.to_string());
        }

        Self::extract_og_title(html)
    }

    /// Read the page title from the `og:title` meta tag or the `<title>` element.
    fn extract_og_title(html: &str) -> Option<String> {
        // Pattern: <meta property="og:title" content="...">
        let og_title_re = Regex::new(r#"<meta\s+property="og:title"\s+content="([^"]+)""#).ok()?;
        if let Some(caps) = og_title_re.captures(html) {
            return Some(html_decode(caps.get(1)?.as_str()));
        }

        // Try: <title>... - YouTube</title>
        let title_re = Regex::new(r"<title>([^<]+?)\s*-\s*YouTube</title>").ok()?;
        if let Some(caps) = title_re.captures(html) {
            return Some(html_decode(caps.get(1)?.as_str()));
        }

        None
    }

    /// Video identifiers of the entries of a renderer kind, deduplicated.
    fn renderer_video_ids(data: &Value, renderer: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for node in find_values(data, renderer) {
            if let Some(id) = node.get("videoId").and_then(Value::as_str)
                && !ids.iter().any(|seen| seen == id)
            {
                ids.push(id.to_string());
            }
        }
        ids
    }

    /// Fallback: extract video IDs using a regex over the raw HTML.
    fn extract_video_ids_regex(html: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();

        // Look for: "videoId":"XXXXXXXXXXX"
        if let Ok(id_regex) = Regex::new(r#""videoId"\s*:\s*"([a-zA-Z0-9_-]{11})""#) {
            for caps in id_regex.captures_iter(html) {
                if let Some(id_match) = caps.get(1) {
                    let id = id_match.as_str();
                    if !ids.iter().any(|seen| seen == id) {
                        ids.push(id.to_string());
                    }
                }
            }
        }

        ids
    }

    /// Displayed text of a renderer field, either `simpleText` or joined `runs`.
    fn renderer_text(field: &Value) -> Option<String> {
        if let Some(text) = field.get("simpleText").and_then(Value::as_str) {
            return Some(text.to_string());
        }

        let runs = field.get("runs")?.as_array()?;
        let text: String = runs
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect();
        (!text.is_empty()).then_some(text)
    }

    /// Video entries of a search results page, deduplicated.
    fn search_results(data: &Value) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = Vec::new();

        for renderer in find_values(data, "videoRenderer") {
            let Some(video_id) = renderer.get("videoId").and_then(Value::as_str) else {
                continue;
            };
            if results.iter().any(|r| r.video_id == video_id) {
                continue;
            }

            let text = |key: &str| renderer.get(key).and_then(Self::renderer_text);
            results.push(SearchResult {
                video_id: video_id.to_string(),
                title: text("title").unwrap_or_default(),
                author: text("ownerText")
                    .or_else(|| text("longBylineText"))
                    .unwrap_or_default(),
                url: watch_url(video_id),
                duration_secs: text("lengthText").as_deref().and_then(parse_duration_text),
            });
        }

        results
    }

    /// Channel display name from the page's metadata renderer.
    fn extract_channel_name(data: &Value, html: &str) -> String {
        find_values(data, "channelMetadataRenderer")
            .find_map(|r| r.get("title").and_then(Value::as_str))
            .map(String::from)
            .or_else(|| Self::extract_og_title(html))
            .unwrap_or_default()
    }
}

/// Playability messages meaning the video needs a signed-in, age-verified
/// account.
const AGE_GATE_MARKERS: [&str; 3] = [
    "confirm your age",
    "age-restricted",
    "inappropriate for some users",
];

/// Playability messages meaning the platform will not serve the video.
const UNAVAILABLE_MARKERS: [&str; 5] = [
    "video unavailable",
    "is private",
    "has been removed",
    "not available in your country",
    "no longer available",
];

/// Map a failed `get_info` call to a crate error.
///
/// Only private, deleted and blocked videos are unavailable. Transport and
/// response parse failures propagate as page failures.
fn info_error(video_id: &str, video_url: &str, err: &VideoError) -> Error {
    match err {
        VideoError::VideoNotFound
        | VideoError::VideoIsPrivate
        | VideoError::VideoSourceNotFound => Error::Download(DownloadError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason: err.to_string(),
        }),
        other => classify_info_failure(video_id, video_url, &other.to_string()),
    }
}

/// Classify a `get_info` failure by its message.
fn classify_info_failure(video_id: &str, video_url: &str, message: &str) -> Error {
    let lowered = message.to_ascii_lowercase();

    if AGE_GATE_MARKERS.iter().any(|m| lowered.contains(m)) {
        Error::Download(DownloadError::AgeRestricted {
            video_id: video_id.to_string(),
        })
    } else if UNAVAILABLE_MARKERS.iter().any(|m| lowered.contains(m)) {
        Error::Download(DownloadError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason: message.to_string(),
        })
    } else {
        Error::Download(DownloadError::PageParseFailed {
            url: video_url.to_string(),
            reason: format!("Failed to get video info: {message}"),
        })
    }
}

/// Run an async `rusty_ytdl` call from blocking code.
///
/// Reuses the current tokio runtime when called from inside one (for example
/// from `spawn_blocking`), otherwise creates a runtime for the call.
fn run_blocking<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        tokio::task::block_in_place(|| handle.block_on(future))
    } else {
        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            Error::Download(DownloadError::RuntimeFailed(format!(
                "Failed to create tokio runtime: {e}"
            )))
        })?;
        rt.block_on(future)
    }
}

impl VideoSource for RustyYtdlSource {
    fn resolve_video(&self, url: &str) -> Result<VideoMetadata> {
        let video_id = extract_video_id(url).ok_or_else(|| InvalidUrlError::Video {
            url: url.to_string(),
        })?;

        run_blocking(Self::resolve_video_async(url.to_string(), video_id))
    }

    fn resolve_playlist(&self, url: &str) -> Result<PlaylistMetadata> {
        let playlist_id = extract_playlist_id(url).ok_or_else(|| InvalidUrlError::Playlist {
            url: url.to_string(),
        })?;
        let page_url = playlist_url(&playlist_id);

        info!("Fetching playlist page: {}", page_url);
        let html = Self::read_html(self.get(&page_url)?, &page_url)?;
        let data = extract_yt_initial_data(&html, &page_url)?;

        let title = Self::extract_playlist_title(&data, &html)
            .unwrap_or_else(|| "Unknown Playlist".to_string());

        let mut ids = Self::renderer_video_ids(&data, "playlistVideoRenderer");
        if ids.is_empty() {
            warn!("No videos found in playlist data, trying alternative extraction");
            ids = Self::extract_video_ids_regex(&html);
        }

        info!("Parsed playlist '{}' with {} videos", title, ids.len());

        Ok(PlaylistMetadata {
            playlist_id,
            title,
            video_urls: ids.iter().map(|id| watch_url(id)).collect(),
        })
    }

    fn resolve_channel(&self, url: &str) -> Result<ChannelMetadata> {
        let response = self.get(url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(InvalidUrlError::Channel {
                url: url.to_string(),
            }
            .into());
        }

        let html = Self::read_html(response, url)?;
        let page_data = extract_yt_initial_data(&html, url)?;
        let name = Self::extract_channel_name(&page_data, &html);
        let video_urls = Self::renderer_video_ids(&page_data, "videoRenderer")
            .iter()
            .map(|id| watch_url(id))
            .collect::<Vec<_>>();

        debug!(
            "Channel page {} ('{}') lists {} videos",
            url,
            name,
            video_urls.len()
        );

        Ok(ChannelMetadata {
            name,
            video_urls,
            page_data,
        })
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        info!("Searching for: {}", query);
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("search_query", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .map_err(|e| {
                Error::Download(DownloadError::PageParseFailed {
                    url: SEARCH_URL.to_string(),
                    reason: format!("Failed to fetch search results: {e}"),
                })
            })?;

        let html = Self::read_html(response, SEARCH_URL)?;
        let data = extract_yt_initial_data(&html, SEARCH_URL)?;
        let results = Self::search_results(&data);
        debug!("Search '{}' parsed {} results", query, results.len());

        Ok(results)
    }

    fn fetch_stream(
        &self,
        stream: &StreamInfo,
        destination_dir: &Path,
        filename: &str,
        skip_if_exists: bool,
    ) -> Result<PathBuf> {
        let output_path = destination_dir.join(filename);
        if skip_if_exists && output_path.exists() {
            info!("Skipping existing file: {}", output_path.display());
            return Ok(output_path);
        }

        if !destination_dir.exists() {
            fs::create_dir_all(destination_dir).map_err(|e| {
                Error::FileSystem(FileSystemError::CreateDirFailed {
                    path: destination_dir.to_path_buf(),
                    reason: e.to_string(),
                })
            })?;
        }

        let fetch_failed = |reason: String| {
            Error::Download(DownloadError::StreamFetchFailed {
                title: filename.to_string(),
                reason,
            })
        };

        let mut response = self
            .client
            .get(&stream.url)
            .send()
            .map_err(|e| fetch_failed(format!("Failed to request stream: {e}")))?;
        if !response.status().is_success() {
            return Err(fetch_failed(format!(
                "Unexpected status {}",
                response.status()
            )));
        }

        let part_path = destination_dir.join(format!("{filename}.part"));
        let mut file = File::create(&part_path).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: part_path.clone(),
                reason: e.to_string(),
            })
        })?;

        let total_bytes = response
            .copy_to(&mut file)
            .map_err(|e| fetch_failed(format!("Failed to download stream: {e}")))?;
        drop(file);

        fs::rename(&part_path, &output_path).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: output_path.clone(),
                reason: e.to_string(),
            })
        })?;

        info!(
            "Successfully downloaded {} bytes -> {}",
            total_bytes,
            output_path.display()
        );
        Ok(output_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_source_config_default() {
        let config = SourceConfig::default();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn test_source_config_deserialize_partial() {
        let config: SourceConfig = serde_json::from_str(r#"{"request_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_extract_playlist_title_from_metadata() {
        let data = json!({"metadata": {"playlistMetadataRenderer": {"title": "Mix Tape"}}});
        assert_eq!(
            RustyYtdlSource::extract_playlist_title(&data, ""),
            Some("Mix Tape".to_string())
        );
    }

    #[test]
    fn test_extract_playlist_title_from_html() {
        let html = r#"<meta property="og:title" content="Rock &amp; Roll">"#;
        assert_eq!(
            RustyYtdlSource::extract_playlist_title(&json!({}), html),
            Some("Rock & Roll".to_string())
        );

        let html = "<title>My List - YouTube</title>";
        assert_eq!(
            RustyYtdlSource::extract_playlist_title(&json!({}), html),
            Some("My List".to_string())
        );
    }

    #[test]
    fn test_renderer_video_ids() {
        let data = json!({
            "contents": [
                {"playlistVideoRenderer": {"videoId": "aaaaaaaaaaa"}},
                {"playlistVideoRenderer": {"videoId": "bbbbbbbbbbb"}},
                {"playlistVideoRenderer": {"videoId": "aaaaaaaaaaa"}},
                {"videoRenderer": {"videoId": "ccccccccccc"}}
            ]
        });
        assert_eq!(
            RustyYtdlSource::renderer_video_ids(&data, "playlistVideoRenderer"),
            vec!["aaaaaaaaaaa", "bbbbbbbbbbb"]
        );
        assert_eq!(
            RustyYtdlSource::renderer_video_ids(&data, "videoRenderer"),
            vec!["ccccccccccc"]
        );
    }

    #[test]
    fn test_extract_video_ids_regex() {
        let html = r#""videoId":"dQw4w9WgXcQ","x":1,"videoId" : "T5KBMhw87n8","videoId":"dQw4w9WgXcQ""#;
        assert_eq!(
            RustyYtdlSource::extract_video_ids_regex(html),
            vec!["dQw4w9WgXcQ", "T5KBMhw87n8"]
        );
    }

    #[test]
    fn test_search_results() {
        let data = json!({
            "contents": {"sectionListRenderer": {"contents": [{"itemSectionRenderer": {"contents": [
                {"videoRenderer": {
                    "videoId": "dQw4w9WgXcQ",
                    "title": {"runs": [{"text": "Never Gonna "}, {"text": "Give You Up"}]},
                    "ownerText": {"runs": [{"text": "Rick Astley"}]},
                    "lengthText": {"simpleText": "3:33"}
                }},
                {"adSlotRenderer": {}},
                {"videoRenderer": {
                    "videoId": "jfKfPfyJRdk",
                    "title": {"runs": [{"text": "lofi radio"}]},
                    "longBylineText": {"runs": [{"text": "Lofi Girl"}]}
                }},
                {"videoRenderer": {"videoId": "dQw4w9WgXcQ"}}
            ]}}]}}
        });

        let results = RustyYtdlSource::search_results(&data);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Never Gonna Give You Up");
        assert_eq!(results[0].author, "Rick Astley");
        assert_eq!(results[0].duration_secs, Some(213));
        assert_eq!(results[0].url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(results[1].author, "Lofi Girl");
        assert_eq!(results[1].duration_secs, None);
    }

    #[test]
    fn test_extract_channel_name() {
        let data = json!({"metadata": {"channelMetadataRenderer": {"title": "standjar danjar"}}});
        assert_eq!(
            RustyYtdlSource::extract_channel_name(&data, ""),
            "standjar danjar"
        );
        assert_eq!(RustyYtdlSource::extract_channel_name(&json!({}), ""), "");
    }

    #[test]
    fn test_info_error_missing_or_private_is_unavailable() {
        let url = watch_url("dQw4w9WgXcQ");
        for err in [
            VideoError::VideoNotFound,
            VideoError::VideoIsPrivate,
            VideoError::VideoSourceNotFound,
        ] {
            let mapped = info_error("dQw4w9WgXcQ", &url, &err);
            assert!(mapped.is_unavailable(), "{err:?} mapped to {mapped:?}");
        }
    }

    #[test]
    fn test_info_error_body_parse_failure_propagates() {
        let url = watch_url("dQw4w9WgXcQ");
        let mapped = info_error("dQw4w9WgXcQ", &url, &VideoError::BodyCannotParsed);

        assert!(!mapped.is_unavailable());
        assert!(!mapped.is_invalid_url());
        assert!(matches!(
            mapped,
            Error::Download(DownloadError::PageParseFailed { .. })
        ));
    }

    #[test]
    fn test_classify_info_failure_network_error_propagates() {
        let url = watch_url("dQw4w9WgXcQ");
        let mapped = classify_info_failure(
            "dQw4w9WgXcQ",
            &url,
            "error sending request for url: tcp connect error: Connection refused",
        );

        assert_eq!(mapped.kind(), ErrorKind::Network);
        assert!(mapped.to_string().contains("Connection refused"));
    }

    #[test]
    fn test_classify_info_failure_age_gate() {
        let mapped = classify_info_failure(
            "gSPbrmIpcy0",
            "https://www.youtube.com/watch?v=gSPbrmIpcy0",
            "Sign in to confirm your age",
        );
        assert!(mapped.is_age_restricted());
    }

    #[test]
    fn test_classify_info_failure_blocked_video() {
        let mapped = classify_info_failure(
            "aaaaaaaaaaa",
            "https://www.youtube.com/watch?v=aaaaaaaaaaa",
            "The uploader has not made this video available in your country. Video unavailable",
        );
        assert!(mapped.is_unavailable());
    }

    #[test]
    fn test_fetch_stream_skips_existing_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("clip.mp4");
        std::fs::write(&existing, b"already here").unwrap();

        let source = RustyYtdlSource::new().unwrap();
        let stream = StreamInfo {
            url: "http://127.0.0.1:9/never-requested".to_string(),
            quality_label: Some("360p".to_string()),
            container: "mp4".to_string(),
            has_audio: true,
            has_video: true,
        };

        let path = source
            .fetch_stream(&stream, dir.path(), "clip.mp4", true)
            .unwrap();
        assert_eq!(path, existing);
        assert_eq!(std::fs::read(&path).unwrap(), b"already here");
    }

    #[test]
    fn test_resolve_video_rejects_unparseable_url() {
        let source = RustyYtdlSource::new().unwrap();
        let err = source.resolve_video("not a video").unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn test_resolve_playlist_rejects_missing_list() {
        let source = RustyYtdlSource::new().unwrap();
        let err = source
            .resolve_playlist("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .unwrap_err();
        assert!(err.is_invalid_url());
    }
}
