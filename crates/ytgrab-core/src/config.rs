//! Application configuration management.
//!
//! Settings live in `<config dir>/ytgrab/config.json`. A missing file yields
//! the defaults, which are written back so the user has something to edit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, FileSystemError, Result};
use crate::layout::DownloadLayout;
use crate::resolution::{DEFAULT_MAX_RESOLUTION, SUPPORTED_RESOLUTIONS};
use crate::source::SourceConfig;

/// Default name of the subscription file inside the download root.
pub const DEFAULT_SUBSCRIPTION_FILE: &str = "programInfo.txt";

const APP_DIR: &str = "ytgrab";
const CONFIG_FILE: &str = "config.json";
const DOWNLOADS_DIR: &str = "YouTube-Downloads";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Root directory all downloads are written under.
    #[serde(default = "default_download_root")]
    pub download_root: PathBuf,
    /// Highest resolution to download, in lines (`720` for 720p).
    #[serde(default = "default_max_resolution")]
    pub max_resolution: u32,
    /// Name of the subscription file inside the download root.
    #[serde(default = "default_subscription_file_name")]
    pub subscription_file_name: String,
    /// Network settings for the video source.
    #[serde(default)]
    pub source: SourceConfig,
}

const fn default_max_resolution() -> u32 {
    DEFAULT_MAX_RESOLUTION
}

fn default_subscription_file_name() -> String {
    DEFAULT_SUBSCRIPTION_FILE.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_root: default_download_root(),
            max_resolution: DEFAULT_MAX_RESOLUTION,
            subscription_file_name: default_subscription_file_name(),
            source: SourceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, creating it with
    /// defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        if !config_path.exists() {
            debug!("Config file not found, using defaults");
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or fails
    /// [`validate`](Self::validate).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to read config file: {e}"),
            })
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        debug!(
            "Download root: {}, max resolution: {}p",
            config.download_root.display(),
            config.max_resolution
        );

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::FileSystem(FileSystemError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    reason: format!("Failed to create config directory: {e}"),
                })
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write config file: {e}"),
            })
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unsupported resolution or an
    /// empty subscription file name.
    pub fn validate(&self) -> Result<()> {
        validate_max_resolution(self.max_resolution)?;

        if self.subscription_file_name.trim().is_empty() {
            return Err(Error::Configuration(
                "Subscription file name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Change the download root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is relative, not a directory, or cannot
    /// be created or written to.
    pub fn set_download_root(&mut self, path: PathBuf) -> Result<()> {
        validate_download_root(&path)?;

        self.download_root = path;
        info!(
            "Updated download root to: {}",
            self.download_root.display()
        );
        Ok(())
    }

    /// Change the resolution cap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unsupported resolution.
    pub fn set_max_resolution(&mut self, max_resolution: u32) -> Result<()> {
        validate_max_resolution(max_resolution)?;
        self.max_resolution = max_resolution;
        Ok(())
    }

    /// Download layout rooted at [`download_root`](Self::download_root).
    #[must_use]
    pub fn layout(&self) -> DownloadLayout {
        DownloadLayout::new(&self.download_root)
    }

    /// Full path of the subscription file.
    #[must_use]
    pub fn subscription_file_path(&self) -> PathBuf {
        self.layout().subscription_file(&self.subscription_file_name)
    }

    /// Get the path to the config file.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        config_file_path()
    }
}

/// Get the default download root.
#[must_use]
pub fn default_download_root() -> PathBuf {
    dirs::video_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DOWNLOADS_DIR)
}

/// Get the path to the config file.
fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

fn validate_max_resolution(max_resolution: u32) -> Result<()> {
    if SUPPORTED_RESOLUTIONS.contains(&max_resolution) {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "Unsupported resolution {max_resolution}p, expected one of {SUPPORTED_RESOLUTIONS:?}"
        )))
    }
}

/// Validate that a directory is suitable as the download root.
fn validate_download_root(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(Error::Configuration(
            "Download root must be an absolute path".to_string(),
        ));
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Configuration(format!(
                "Path exists but is not a directory: {}",
                path.display()
            )));
        }

        let test_file = path.join(".ytgrab_write_test");
        match fs::write(&test_file, "test") {
            Ok(()) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                return Err(Error::Configuration(format!(
                    "Directory is not writable: {} ({})",
                    path.display(),
                    e
                )));
            }
        }
    } else {
        fs::create_dir_all(path).map_err(|e| {
            Error::Configuration(format!("Cannot create directory {}: {}", path.display(), e))
        })?;
    }

    Ok(())
}
