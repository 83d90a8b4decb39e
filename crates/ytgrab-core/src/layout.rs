//! Where downloads land on disk.
//!
//! ```text
//! <root>/
//! ├── <author>/<title>.mp4       one directory per channel
//! ├── Playlists/<title>.txt      playlist manifests
//! └── programInfo.txt            subscription file (name configurable)
//! ```

use std::path::{Path, PathBuf};

use crate::sanitize::sanitize;

/// Directory under the root holding playlist manifests.
pub const PLAYLISTS_DIR: &str = "Playlists";

/// Extension of playlist manifest files.
pub const MANIFEST_EXTENSION: &str = "txt";

/// Directory used for videos whose channel name leaves no usable segment.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A sanitized channel name usable as a single directory below the root.
///
/// Empty and dot-only names would resolve to the root or above it, so they
/// map to [`UNKNOWN_AUTHOR`].
#[must_use]
pub fn author_segment(author: &str) -> &str {
    if author.trim_matches('.').trim().is_empty() {
        UNKNOWN_AUTHOR
    } else {
        author
    }
}

/// Path layout rooted at the download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLayout {
    root: PathBuf,
}

impl DownloadLayout {
    /// Create a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The download root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a channel's videos. `author` must already be sanitized.
    #[must_use]
    pub fn channel_dir(&self, author: &str) -> PathBuf {
        self.root.join(author_segment(author))
    }

    /// Directory holding playlist manifests.
    #[must_use]
    pub fn playlists_dir(&self) -> PathBuf {
        self.root.join(PLAYLISTS_DIR)
    }

    /// Manifest file for a playlist title.
    #[must_use]
    pub fn manifest_path(&self, playlist_title: &str) -> PathBuf {
        self.playlists_dir()
            .join(format!("{}.{MANIFEST_EXTENSION}", sanitize(playlist_title)))
    }

    /// The subscription file.
    #[must_use]
    pub fn subscription_file(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = DownloadLayout::new("/downloads");
        assert_eq!(layout.root(), Path::new("/downloads"));
        assert_eq!(
            layout.channel_dir("standjar danjar"),
            PathBuf::from("/downloads/standjar danjar")
        );
        assert_eq!(layout.playlists_dir(), PathBuf::from("/downloads/Playlists"));
        assert_eq!(
            layout.subscription_file("programInfo.txt"),
            PathBuf::from("/downloads/programInfo.txt")
        );
    }

    #[test]
    fn test_channel_dir_stays_below_root() {
        let layout = DownloadLayout::new("/downloads");
        for author in ["", "..", ".", "...", " . "] {
            assert_eq!(
                layout.channel_dir(author),
                PathBuf::from("/downloads/Unknown"),
                "author: {author:?}"
            );
        }
        assert_eq!(
            layout.channel_dir("..hidden"),
            PathBuf::from("/downloads/..hidden")
        );
    }

    #[test]
    fn test_author_segment() {
        assert_eq!(author_segment("Band"), "Band");
        assert_eq!(author_segment(".."), UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_manifest_path_is_sanitized_and_deterministic() {
        let layout = DownloadLayout::new("/downloads");
        let first = layout.manifest_path("Best of: 2024?");
        assert_eq!(first, PathBuf::from("/downloads/Playlists/Best of 2024.txt"));
        assert_eq!(layout.manifest_path("Best of: 2024?"), first);
    }
}
