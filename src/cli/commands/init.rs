use super::CommandHandler;
use crate::config::{RootConfig, CONFIG_FILE_NAME};
use crate::{MatcherError, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

const HEADER: &str = "# isbn-matcher configuration
#
# matcher.profile selects a preset (basic, aggressive, ultra); any other key in
# the matcher section overrides that preset. Series, subjects and aliases are
# scanned in order, first hit wins.

";

/// Handler for the `init` command
pub struct InitCommand {
    pub output: Option<PathBuf>,
    pub force: bool,
}

impl CommandHandler for InitCommand {
    fn execute(&self) -> Result<()> {
        let path = self.target();

        if path.exists() && !self.force {
            return Err(MatcherError::Cli(format!(
                "{} already exists, use --force to overwrite",
                path.display()
            )));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                MatcherError::Config(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let body = serde_yaml_ng::to_string(&RootConfig::default())?;
        fs::write(&path, format!("{}{}", HEADER, body)).map_err(|e| {
            MatcherError::Config(format!(
                "Failed to write configuration {}: {}",
                path.display(),
                e
            ))
        })?;

        info!("Wrote default configuration to {}", path.display());
        println!("Created {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "init"
    }
}

impl InitCommand {
    pub fn new(output: Option<PathBuf>, force: bool) -> Self {
        Self { output, force }
    }

    fn target(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_written_config_loads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE_NAME);

        InitCommand::new(Some(path.clone()), false).execute().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# isbn-matcher configuration"));

        let loaded = ConfigLoader::for_project(temp.path())
            .load_file(&path)
            .unwrap();
        let defaults = RootConfig::default();
        assert_eq!(loaded.series, defaults.series);
        assert_eq!(loaded.aliases, defaults.aliases);
        assert_eq!(loaded.batch.checkpoint_size, 100);
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "series: [쎈]\n").unwrap();

        let result = InitCommand::new(Some(path.clone()), false).execute();
        assert!(matches!(result, Err(MatcherError::Cli(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "series: [쎈]\n");

        InitCommand::new(Some(path.clone()), true).execute().unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("aliases"));
    }
}
