use super::cascade::{CascadeBuilder, MatchPredicate};
use super::extractor::Extractor;
use super::types::{AttributeRecord, Resolution};
use crate::config::{MatcherProfile, RootConfig};
use crate::store::CatalogStore;
use tracing::{debug, trace, warn};

/// Resolves titles to catalog identifiers by walking the cascade
pub struct Resolver<C> {
    catalog: C,
    extractor: Extractor,
    cascade: CascadeBuilder,
}

impl<C: CatalogStore> Resolver<C> {
    pub fn new(catalog: C, extractor: Extractor) -> Self {
        let cascade = CascadeBuilder::new(extractor.profile());
        Self {
            catalog,
            extractor,
            cascade,
        }
    }

    pub fn from_config(catalog: C, config: &RootConfig, profile: MatcherProfile) -> Self {
        Self::new(catalog, Extractor::from_config(config, profile))
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Resolve one title; `None` when no cascade level finds a row
    pub fn resolve(&self, title: &str) -> Option<Resolution> {
        let attrs = self.extractor.extract(title);
        let cascade = self.cascade.build(&attrs);
        self.run_cascade(title, &attrs, &cascade)
    }

    fn run_cascade(
        &self,
        title: &str,
        attrs: &AttributeRecord,
        cascade: &[MatchPredicate],
    ) -> Option<Resolution> {
        let series = attrs.effective_series()?;

        for predicate in cascade {
            let rows = match self.catalog.find(predicate) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Cascade level {} failed for '{}': {}", predicate.level, title, e);
                    continue;
                }
            };

            trace!("{} returned {} rows for '{}'", predicate.level, rows.len(), title);

            if let Some(first) = rows.into_iter().next() {
                debug!("Resolved '{}' to {} at {}", title, first.isbn, predicate.level);
                return Some(Resolution {
                    isbn: first.isbn,
                    catalog_title: first.title,
                    series: series.to_string(),
                    level: predicate.level,
                });
            }
        }

        None
    }
}
