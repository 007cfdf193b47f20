//! Configuration module

use crate::archive::{ArchiveFormat, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Archive defaults
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Folder counting and listing defaults
    #[serde(default)]
    pub listing: ListingConfig,
}

/// Archive defaults used when a request leaves them out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Default archive format: zip, tar or tar.gz
    pub default_format: ArchiveFormat,
    /// Default compression level (0-9)
    pub compression_level: u32,
    /// Extract into non-empty directories by default
    pub overwrite: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            default_format: ArchiveFormat::Zip,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            overwrite: false,
        }
    }
}

/// Listing defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Folder used when a request names none (desktop when unset)
    pub default_folder: Option<PathBuf>,
    /// Show dot-files by default
    #[serde(default)]
    pub include_hidden: bool,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| Error::Config("Unable to determine config directory".to_string()))?;

        Ok(config_dir.join("fileops").join("config.toml"))
    }

    /// Get default configuration content with comments
    pub fn default_config_content() -> String {
        r#"# fileops configuration

[archive]
# Default archive format: zip, tar, tar.gz
default_format = "zip"
# Default compression level (0 = store, 9 = smallest)
compression_level = 6
# Allow extracting into a directory that already has files
overwrite = false

[listing]
# Folder used by count/list when none is given (defaults to the desktop)
# default_folder = "/home/me/Desktop"
# Show dot-files when listing
include_hidden = false
"#
        .to_string()
    }

    /// Load configuration from the default location, creating it on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing the commented defaults there
    /// if it does not exist yet
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, Self::default_config_content())?;
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration or use defaults if loading fails
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Reject values the operations would refuse anyway
    pub fn validate(&self) -> Result<()> {
        if self.archive.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(Error::Config(format!(
                "compression_level {} is outside 0-{}",
                self.archive.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }
        Ok(())
    }

    /// Folder used when a request names none
    pub fn default_folder(&self) -> PathBuf {
        self.listing
            .default_folder
            .clone()
            .unwrap_or_else(crate::fsops::default_folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.archive.default_format, ArchiveFormat::Zip);
        assert_eq!(config.archive.compression_level, 6);
        assert!(!config.archive.overwrite);
        assert!(!config.listing.include_hidden);
    }

    #[test]
    fn test_default_content_matches_default() {
        let parsed: Config = toml::from_str(&Config::default_config_content()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_creates_file_and_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, Config::default());

        let mut changed = config.clone();
        changed.archive.default_format = ArchiveFormat::TarGz;
        changed.listing.default_folder = Some(PathBuf::from("/data"));
        changed.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, changed);
        assert_eq!(reloaded.default_folder(), PathBuf::from("/data"));
    }

    #[test]
    fn test_invalid_level_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[archive]\ndefault_format = \"tar\"\ncompression_level = 12\noverwrite = false\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
