use crate::config::CONFIG_FILE_NAME;
use crate::{MatcherError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Path management for isbn-matcher configuration files
#[derive(Debug, Clone)]
pub struct MatcherPaths {
    /// User configuration directory
    pub config_dir: PathBuf,
}

impl MatcherPaths {
    /// Create new paths instance using standard directories
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "isbn-matcher").ok_or_else(|| {
            MatcherError::Path("Failed to determine project directories".to_string())
        })?;

        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
        })
    }

    /// Configuration file inside the config directory
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}
