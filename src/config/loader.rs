use super::types::{RootConfig, MAX_YEAR_WINDOW};
use crate::io::paths::MatcherPaths;
use crate::{MatcherError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "isbn-matcher.yaml";

/// Configuration loader for isbn-matcher.yaml
pub struct ConfigLoader {
    /// Directory searched before the user config directory
    project_root: PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at the current working directory
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            MatcherError::Config(format!("Failed to get current directory: {}", e))
        })?;
        Ok(Self::for_project(cwd))
    }

    /// Create a loader rooted at a specific directory
    pub fn for_project<P: AsRef<Path>>(project_root: P) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from an explicit path, or discover it.
    ///
    /// Discovery order: project directory, user config directory, built-in defaults.
    pub fn load(&self, explicit: Option<&Path>) -> Result<RootConfig> {
        if let Some(path) = explicit {
            return self.load_file(path);
        }

        let project_file = self.project_root.join(CONFIG_FILE_NAME);
        if project_file.exists() {
            return self.load_file(&project_file);
        }

        match MatcherPaths::new() {
            Ok(paths) => {
                let user_file = paths.config_file();
                if user_file.exists() {
                    return self.load_file(&user_file);
                }
            }
            Err(e) => warn!("Skipping user configuration: {}", e),
        }

        debug!("No configuration file found, using defaults");
        Ok(RootConfig::default())
    }

    /// Load and validate one configuration file
    pub fn load_file(&self, path: &Path) -> Result<RootConfig> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MatcherError::Config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: RootConfig = serde_yaml_ng::from_str(&contents).map_err(|e| {
            MatcherError::Config(format!(
                "Failed to parse configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        validate(&config)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Validate configuration structure and content
pub fn validate(config: &RootConfig) -> Result<()> {
    if config.series.is_empty() {
        return Err(MatcherError::Config(
            "Series list must contain at least one entry".to_string(),
        ));
    }

    if let Some(index) = config.series.iter().position(|s| s.trim().is_empty()) {
        return Err(MatcherError::Config(format!(
            "Series entry at index {} is empty",
            index
        )));
    }

    if config.subjects.iter().any(|s| s.trim().is_empty()) {
        return Err(MatcherError::Config(
            "Subject vocabulary contains an empty entry".to_string(),
        ));
    }

    if let Some(window) = config.matcher.year_window {
        if window > MAX_YEAR_WINDOW {
            return Err(MatcherError::Config(format!(
                "year_window {} exceeds the maximum of {}",
                window, MAX_YEAR_WINDOW
            )));
        }
    }

    if config.matcher.row_limit == Some(0) {
        return Err(MatcherError::Config(
            "row_limit must be at least 1".to_string(),
        ));
    }

    if config.batch.checkpoint_size == 0 {
        return Err(MatcherError::Config(
            "checkpoint_size must be at least 1".to_string(),
        ));
    }

    for entry in config.aliases.entries() {
        if entry.canonical.trim().is_empty() {
            return Err(MatcherError::Config(
                "Alias entry has an empty canonical name".to_string(),
            ));
        }
        if entry.aliases.is_empty() || entry.aliases.iter().any(|a| a.is_empty()) {
            return Err(MatcherError::Config(format!(
                "Alias entry '{}' has a missing or empty alias",
                entry.canonical
            )));
        }
    }

    Ok(())
}
