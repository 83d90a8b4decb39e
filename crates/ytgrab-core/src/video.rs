//! Single-video downloads.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{InvalidUrlError, Result};
use crate::layout::{DownloadLayout, author_segment};
use crate::resolution::{TARGET_CONTAINER, progressive_streams, select_stream};
use crate::sanitize::{sanitize, sanitize_file_name};
use crate::source::{VideoMetadata, VideoSource};
use crate::url::extract_video_id;

/// Suffix appended to the result name of a video skipped for age restriction.
pub const AGE_RESTRICTED_SUFFIX: &str = " (Skipped as Age Restricted)";

/// A resolved video, ready to download into its channel directory.
pub struct VideoRef<'a> {
    source: &'a dyn VideoSource,
    url: String,
    metadata: VideoMetadata,
    clean_title: String,
    clean_author: String,
    download_path: PathBuf,
}

impl fmt::Debug for VideoRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoRef")
            .field("url", &self.url)
            .field("clean_title", &self.clean_title)
            .field("clean_author", &self.clean_author)
            .field("download_path", &self.download_path)
            .finish_non_exhaustive()
    }
}

impl<'a> VideoRef<'a> {
    /// Resolve `url` into a video.
    ///
    /// # Errors
    ///
    /// [`InvalidUrlError::Video`] when the URL holds no video identifier;
    /// `VideoUnavailable` when the source cannot fetch the video. Other source
    /// errors propagate unchanged.
    pub fn new(source: &'a dyn VideoSource, layout: &DownloadLayout, url: &str) -> Result<Self> {
        if extract_video_id(url).is_none() {
            return Err(InvalidUrlError::Video {
                url: url.to_string(),
            }
            .into());
        }

        let metadata = source.resolve_video(url)?;
        let clean_title = sanitize_file_name(&metadata.title, TARGET_CONTAINER);
        let clean_author = author_segment(&sanitize(&metadata.author)).to_string();
        let download_path = layout.channel_dir(&clean_author);

        info!("Creating video object: {} from {}", clean_title, url);

        Ok(Self {
            source,
            url: url.to_string(),
            metadata,
            clean_title,
            clean_author,
            download_path,
        })
    }

    /// The URL this video was created from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Metadata reported by the source.
    #[must_use]
    pub const fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Sanitized title including the container extension.
    #[must_use]
    pub fn clean_title(&self) -> &str {
        &self.clean_title
    }

    /// Sanitized channel name.
    #[must_use]
    pub fn clean_author(&self) -> &str {
        &self.clean_author
    }

    /// Directory the video is written to.
    #[must_use]
    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    /// `<author>/<title>`, the name recorded in playlist manifests.
    #[must_use]
    pub fn video_name(&self) -> String {
        format!("{}/{}", self.clean_author, self.clean_title)
    }

    /// Download the best progressive stream not above `max_resolution`.
    ///
    /// An existing file with the same name is kept, so re-running is cheap.
    /// Age-restricted videos are not an error: their name is returned with
    /// [`AGE_RESTRICTED_SUFFIX`] so batch downloads carry on.
    pub fn download(&self, max_resolution: u32) -> Result<String> {
        let video_name = self.video_name();
        let skipped = || format!("{video_name}{AGE_RESTRICTED_SUFFIX}");

        if self.metadata.age_restricted {
            warn!(
                "Video {} is age restricted, skipping as no credentials",
                self.url
            );
            return Ok(skipped());
        }

        let candidates = progressive_streams(&self.metadata.streams);
        debug!(
            "Resolutions for {}: {:?}",
            self.url,
            candidates
                .iter()
                .map(|s| s.quality_label.as_deref())
                .collect::<Vec<_>>()
        );

        let best = select_stream(&candidates, max_resolution, &self.metadata.title)?;
        debug!("Best res: {:?}", best.quality_label);

        match self
            .source
            .fetch_stream(best, &self.download_path, &self.clean_title, true)
        {
            Ok(path) => {
                info!(
                    "Video downloaded: {} with ID: {}",
                    path.display(),
                    self.metadata.video_id
                );
                Ok(video_name)
            }
            Err(e) if e.is_age_restricted() => {
                warn!(
                    "Video {} is age restricted, skipping as no credentials",
                    self.url
                );
                Ok(skipped())
            }
            Err(e) => Err(e),
        }
    }
}
