use super::fill::require_database;
use super::{load_config, CommandHandler};
use crate::cli::OutputFormat;
use crate::config::ProfileName;
use crate::engine::{Extractor, Resolution, Resolver};
use crate::store::SqliteCatalog;
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Handler for the `resolve` command
pub struct ResolveCommand {
    pub title: String,
    pub catalog_db: PathBuf,
    pub profile: Option<ProfileName>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    title: &'a str,
    resolved: bool,
    #[serde(flatten)]
    resolution: Option<&'a Resolution>,
}

impl CommandHandler for ResolveCommand {
    fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let profile = config.matcher.profile(self.profile);

        require_database(&self.catalog_db)?;
        let catalog = SqliteCatalog::open(&self.catalog_db)?;
        catalog.ensure_schema()?;

        let resolver = Resolver::new(catalog, Extractor::from_config(&config, profile));
        let resolution = resolver.resolve(&self.title);

        match self.format {
            OutputFormat::Text => match &resolution {
                Some(r) => {
                    println!("{}", r.isbn);
                    println!("  catalog title: {}", r.catalog_title);
                    println!("  series:        {}", r.series);
                    println!("  matched at:    {}", r.level);
                }
                None => println!("No match for '{}'", self.title),
            },
            OutputFormat::Json => {
                let output = ResolveOutput {
                    title: &self.title,
                    resolved: resolution.is_some(),
                    resolution: resolution.as_ref(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "resolve"
    }
}
