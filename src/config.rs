//! Configuration loading and management
//!
//! Handles parsing of the optional `~/.todo.toml` file. Every key is
//! optional; missing keys fall back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the default data file in the home directory
pub const DATA_FILE_NAME: &str = ".todo.json";

/// Name of the default config file in the home directory
pub const CONFIG_FILE_NAME: &str = ".todo.toml";

/// Name of the backup directory created beside the data file
pub const BACKUP_DIR_NAME: &str = "todo_backups";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the JSON file holding the task list
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Directory for snapshots (defaults to `todo_backups/` beside the data file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// Number of snapshots retained after each backup
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Maximum task content length, in characters
    #[serde(default = "default_max_content_len")]
    pub max_content_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            backup_dir: None,
            max_backups: default_max_backups(),
            max_content_len: default_max_content_len(),
        }
    }
}

fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_file() -> PathBuf {
    home_dir().join(DATA_FILE_NAME)
}

fn default_max_backups() -> usize {
    5
}

fn default_max_content_len() -> usize {
    200
}

/// Path of the config file in the user's home directory
pub fn default_config_path() -> PathBuf {
    home_dir().join(CONFIG_FILE_NAME)
}

impl Config {
    /// Defaults with an explicit data file
    pub fn for_data_file(path: impl Into<PathBuf>) -> Self {
        Self {
            data_file: path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `~/.todo.toml` if present, otherwise return defaults
    pub fn load_default() -> Result<Self> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Directory where snapshots of the data file are kept
    pub fn backup_dir(&self) -> PathBuf {
        if let Some(dir) = &self.backup_dir {
            return dir.clone();
        }
        self.data_file
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(BACKUP_DIR_NAME)
    }

    fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "data_file cannot be empty".to_string(),
            ));
        }
        if self.max_backups == 0 {
            return Err(Error::InvalidConfig(
                "max_backups must be >= 1".to_string(),
            ));
        }
        if self.max_content_len == 0 {
            return Err(Error::InvalidConfig(
                "max_content_len must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
