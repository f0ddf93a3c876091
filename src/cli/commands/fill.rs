use super::{load_config, CommandHandler};
use crate::cli::OutputFormat;
use crate::config::ProfileName;
use crate::engine::{BatchApplier, BatchOptions, Extractor, Resolver};
use crate::store::{SqliteCatalog, SqliteListings};
use crate::{MatcherError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Handler for the `fill` command
pub struct FillCommand {
    pub db: PathBuf,
    pub catalog_db: Option<PathBuf>,
    pub dry_run: bool,
    pub limit: Option<usize>,
    pub account: Option<i64>,
    pub profile: Option<ProfileName>,
    pub checkpoint: Option<usize>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

impl CommandHandler for FillCommand {
    fn execute(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(MatcherError::Cli("--limit must be at least 1".to_string()));
        }

        let mut config = load_config(self.config.as_deref())?;
        if let Some(checkpoint) = self.checkpoint {
            if checkpoint == 0 {
                return Err(MatcherError::Cli(
                    "--checkpoint must be at least 1".to_string(),
                ));
            }
            config.batch.checkpoint_size = checkpoint;
        }
        let profile = config.matcher.profile(self.profile);

        let catalog_path = self.catalog_db.as_deref().unwrap_or(&self.db);
        require_database(&self.db)?;
        require_database(catalog_path)?;

        let catalog = SqliteCatalog::open(catalog_path)?;
        catalog.ensure_schema()?;
        let listings = SqliteListings::open(&self.db)?;
        listings.ensure_schema()?;

        info!(
            "Filling ISBNs in {} from catalog {} ({} books)",
            self.db.display(),
            catalog_path.display(),
            catalog.count()?
        );

        let resolver = Resolver::new(catalog, Extractor::from_config(&config, profile));
        let mut applier = BatchApplier::new(resolver, listings, config.batch.clone());
        let report = applier.run(&BatchOptions {
            dry_run: self.dry_run,
            limit: self.limit,
            account_id: self.account,
        })?;

        match self.format {
            OutputFormat::Text => print!("{}", report.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fill"
    }
}

/// Opening a missing path would silently create an empty database
pub(crate) fn require_database(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MatcherError::Cli(format!(
            "Database not found: {}",
            path.display()
        )))
    }
}
