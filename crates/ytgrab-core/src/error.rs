//! Error types for ytgrab core operations.
//!
//! Errors are grouped by domain. The [`InvalidUrlError`] family is used by the
//! link classifier to fall through from one link kind to the next and is never
//! shown to the user directly; [`DownloadError::VideoUnavailable`] and
//! [`DownloadError::AgeRestricted`] are recovered at the playlist/channel level.
//! Everything else propagates to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ytgrab core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL is not a link of the requested kind.
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrlError),

    /// Resolving or transferring remote media failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// A file system operation failed.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A URL that does not denote the expected kind of link.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidUrlError {
    /// No video identifier could be parsed from the URL.
    #[error("Invalid video url: {url}")]
    Video {
        /// The offending URL.
        url: String,
    },

    /// The URL carries no playlist identifier.
    #[error("Invalid playlist url: {url}")]
    Playlist {
        /// The offending URL.
        url: String,
    },

    /// The URL does not resolve to a channel.
    #[error("Invalid channel url: {url}")]
    Channel {
        /// The offending URL.
        url: String,
    },
}

impl InvalidUrlError {
    /// The URL that failed to parse.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Video { url } | Self::Playlist { url } | Self::Channel { url } => url,
        }
    }
}

/// Errors raised while resolving or downloading remote media.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The video cannot be fetched (private, deleted, region-blocked).
    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable {
        /// Video identifier or URL.
        video_id: String,
        /// Reason reported by the source.
        reason: String,
    },

    /// The video requires a signed-in, age-verified account.
    #[error("Video {video_id} is age restricted")]
    AgeRestricted {
        /// Video identifier.
        video_id: String,
    },

    /// No stream matched the progressive/container filter.
    #[error("No downloadable streams for {title}")]
    NoStreams {
        /// Video title.
        title: String,
    },

    /// Transferring a stream to disk failed.
    #[error("Failed to fetch stream for {title}: {reason}")]
    StreamFetchFailed {
        /// Video title.
        title: String,
        /// Failure reason.
        reason: String,
    },

    /// A playlist or channel page could not be fetched or parsed.
    #[error("Failed to parse page {url}: {reason}")]
    PageParseFailed {
        /// Page URL.
        url: String,
        /// Failure reason.
        reason: String,
    },

    /// The async runtime used to drive the extractor could not be created.
    #[error("Async runtime failure: {0}")]
    RuntimeFailed(String),
}

/// File system errors, always carrying the path involved.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Reading a file failed.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// Path being read.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// Path being written.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// Creating a directory failed.
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirFailed {
        /// Directory path.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// Deleting a file failed.
    #[error("Failed to delete {path}: {reason}")]
    DeleteFailed {
        /// Path being deleted.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },
}

/// Coarse error category, for logging and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::InvalidUrl`].
    InvalidUrl,
    /// Video unavailable or age restricted.
    Unavailable,
    /// Network or extraction failure.
    Network,
    /// Disk failure.
    FileSystem,
    /// Bad configuration.
    Configuration,
    /// Anything else.
    Internal,
}

impl Error {
    /// Categorize this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::Download(
                DownloadError::VideoUnavailable { .. } | DownloadError::AgeRestricted { .. },
            ) => ErrorKind::Unavailable,
            Self::Download(DownloadError::RuntimeFailed(_)) => ErrorKind::Internal,
            Self::Download(_) => ErrorKind::Network,
            Self::FileSystem(_) | Self::Io(_) => ErrorKind::FileSystem,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Whether this is one of the invalid-URL errors used for classification.
    #[must_use]
    pub const fn is_invalid_url(&self) -> bool {
        matches!(self, Self::InvalidUrl(_))
    }

    /// Whether the remote source reported the video as unavailable.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Download(DownloadError::VideoUnavailable { .. }))
    }

    /// Whether the remote source reported the video as age restricted.
    #[must_use]
    pub const fn is_age_restricted(&self) -> bool {
        matches!(self, Self::Download(DownloadError::AgeRestricted { .. }))
    }
}
