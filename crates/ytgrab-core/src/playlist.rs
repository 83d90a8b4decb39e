//! Playlist downloads and their on-disk manifests.
//!
//! Each downloaded playlist leaves a manifest at
//! `<root>/Playlists/<title>.txt` listing one `<author>/<title>` entry per
//! line. Re-downloading a playlist merges into the existing manifest instead
//! of duplicating entries.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ErrorKind, FileSystemError, InvalidUrlError, Result};
use crate::layout::DownloadLayout;
use crate::sanitize::sanitize;
use crate::source::VideoSource;
use crate::url::has_playlist_marker;
use crate::video::VideoRef;

/// A resolved playlist and its available videos.
pub struct PlaylistRef<'a> {
    url: String,
    playlist_id: String,
    clean_title: String,
    videos: Vec<VideoRef<'a>>,
    manifest_path: PathBuf,
}

impl fmt::Debug for PlaylistRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistRef")
            .field("url", &self.url)
            .field("playlist_id", &self.playlist_id)
            .field("clean_title", &self.clean_title)
            .field("videos", &self.videos)
            .field("manifest_path", &self.manifest_path)
            .finish()
    }
}

impl<'a> PlaylistRef<'a> {
    /// Resolve `url` into a playlist, building a [`VideoRef`] per entry.
    ///
    /// Unavailable entries are logged and left out, so the playlist may hold
    /// fewer videos than the platform lists.
    ///
    /// # Errors
    ///
    /// [`InvalidUrlError::Playlist`] when the URL has no `list=` marker. Any
    /// error other than an unavailable entry propagates.
    pub fn new(source: &'a dyn VideoSource, layout: &DownloadLayout, url: &str) -> Result<Self> {
        if !has_playlist_marker(url) {
            return Err(InvalidUrlError::Playlist {
                url: url.to_string(),
            }
            .into());
        }

        let metadata = source.resolve_playlist(url)?;
        let clean_title = sanitize(&metadata.title);
        info!(
            "Creating playlist object: {} ({} entries)",
            clean_title,
            metadata.video_urls.len()
        );

        let mut videos = Vec::with_capacity(metadata.video_urls.len());
        for video_url in &metadata.video_urls {
            match VideoRef::new(source, layout, video_url) {
                Ok(video) => videos.push(video),
                Err(e) if e.kind() == ErrorKind::Unavailable => {
                    warn!("Video from {} is unavailable, skipping: {}", video_url, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            url: url.to_string(),
            playlist_id: metadata.playlist_id,
            manifest_path: layout.manifest_path(&clean_title),
            clean_title,
            videos,
        })
    }

    /// The URL this playlist was created from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Platform playlist identifier.
    #[must_use]
    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    /// Sanitized playlist title.
    #[must_use]
    pub fn clean_title(&self) -> &str {
        &self.clean_title
    }

    /// The available videos, in playlist order.
    #[must_use]
    pub fn videos(&self) -> &[VideoRef<'a>] {
        &self.videos
    }

    /// Where this playlist's manifest is written.
    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Download every video and rewrite the manifest.
    ///
    /// When a manifest already exists its entries are kept and new results
    /// are only added if not yet listed. Any video failure aborts the whole
    /// playlist.
    ///
    /// Returns the manifest path.
    pub fn download(&self, max_resolution: u32) -> Result<PathBuf> {
        if let Some(dir) = self.manifest_path.parent() {
            fs::create_dir_all(dir).map_err(|e| FileSystemError::CreateDirFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let lines = match read_manifest(&self.manifest_path)? {
            Some(mut lines) => {
                debug!(
                    "Merging into existing manifest {} ({} entries)",
                    self.manifest_path.display(),
                    lines.len()
                );
                fs::remove_file(&self.manifest_path).map_err(|e| {
                    FileSystemError::DeleteFailed {
                        path: self.manifest_path.clone(),
                        reason: e.to_string(),
                    }
                })?;

                for video in &self.videos {
                    let name = video.download(max_resolution)?;
                    if lines.contains(&name) {
                        debug!("{} already in manifest", name);
                    } else {
                        lines.push(name);
                    }
                }
                lines
            }
            None => self
                .videos
                .iter()
                .map(|video| video.download(max_resolution))
                .collect::<Result<Vec<_>>>()?,
        };

        write_manifest(&self.manifest_path, &lines)?;
        info!(
            "Playlist {} downloaded, manifest at {}",
            self.clean_title,
            self.manifest_path.display()
        );

        Ok(self.manifest_path.clone())
    }
}

/// Read a manifest's entries, or `None` if the file does not exist.
pub fn read_manifest(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| FileSystemError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(Some(contents.lines().map(ToString::to_string).collect()))
}

/// Write manifest entries, one per line, replacing the file.
pub fn write_manifest(path: &Path, lines: &[String]) -> Result<()> {
    let contents: String = lines.iter().map(|line| format!("{line}\n")).collect();

    fs::write(path, contents).map_err(|e| {
        FileSystemError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}
