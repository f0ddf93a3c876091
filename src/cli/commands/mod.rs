pub mod extract;
pub mod fill;
pub mod init;
pub mod resolve;

use crate::config::{ConfigLoader, RootConfig};
use crate::Result;
use std::path::Path;

/// Common trait for all command handlers
pub trait CommandHandler {
    /// Execute the command
    fn execute(&self) -> Result<()>;

    /// Get command name for logging
    fn name(&self) -> &'static str;
}

/// Load the explicit configuration file, or discover one from the working directory
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<RootConfig> {
    ConfigLoader::new()?.load(explicit)
}
