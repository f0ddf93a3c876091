//! Batch update applier
//!
//! Walks unresolved listings in id order, resolves each title through the
//! cascade, skips identifiers the account already holds, and writes the rest in
//! checkpointed groups. A dry run takes the same decisions without touching the
//! listing store, so both modes report identical statistics.

use super::resolver::Resolver;
use super::types::{CascadeLevel, ResolutionResult};
use crate::config::{BatchSettings, ProfileName};
use crate::store::{CatalogStore, ListingFilter, ListingRecord, ListingStore};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Options for a single batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub dry_run: bool,
    pub limit: Option<usize>,
    pub account_id: Option<i64>,
}

impl BatchOptions {
    fn filter(&self) -> ListingFilter {
        ListingFilter {
            account_id: self.account_id,
            limit: self.limit,
        }
    }
}

/// Statistics of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub profile: ProfileName,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Listings examined
    pub total: usize,
    /// Listings the cascade found a catalog row for
    pub resolved: usize,
    pub unresolved: usize,
    /// Resolved listings skipped because the account already holds the identifier
    pub duplicates: usize,
    /// Identifiers written, or that would have been written in a dry run
    pub written: usize,
    pub write_failures: usize,
    /// Writes discarded because the checkpoint holding them failed
    pub commit_failures: usize,
    pub by_series: BTreeMap<String, usize>,
    pub by_level: BTreeMap<CascadeLevel, usize>,
    /// First resolutions of the run
    pub samples: Vec<ResolutionResult>,
}

impl BatchReport {
    fn start(profile: ProfileName, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            dry_run,
            profile,
            started_at: now,
            finished_at: now,
            total: 0,
            resolved: 0,
            unresolved: 0,
            duplicates: 0,
            written: 0,
            write_failures: 0,
            commit_failures: 0,
            by_series: BTreeMap::new(),
            by_level: BTreeMap::new(),
            samples: Vec::new(),
        }
    }

    /// Percentage of examined listings that received an identifier
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.written as f64 * 100.0 / self.total as f64
        }
    }

    /// Same counters, ignoring run identity and timing
    pub fn same_counts(&self, other: &BatchReport) -> bool {
        self.total == other.total
            && self.resolved == other.resolved
            && self.unresolved == other.unresolved
            && self.duplicates == other.duplicates
            && self.written == other.written
            && self.write_failures == other.write_failures
            && self.commit_failures == other.commit_failures
            && self.by_series == other.by_series
            && self.by_level == other.by_level
    }

    /// Human readable summary
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { "dry run" } else { "live" };

        let _ = writeln!(out, "Batch {} ({}, profile {})", self.run_id, mode, self.profile);
        let _ = writeln!(out, "  total:          {}", self.total);
        let _ = writeln!(out, "  resolved:       {}", self.resolved);
        let _ = writeln!(out, "  unresolved:     {}", self.unresolved);
        let _ = writeln!(out, "  duplicates:     {}", self.duplicates);
        let _ = writeln!(
            out,
            "  {}:   {} ({:.1}%)",
            if self.dry_run { "would write" } else { "written    " },
            self.written,
            self.success_rate()
        );
        let _ = writeln!(out, "  write failures: {}", self.write_failures);
        if self.commit_failures > 0 {
            let _ = writeln!(out, "  lost in failed commits: {}", self.commit_failures);
        }

        if !self.by_level.is_empty() {
            let _ = writeln!(out, "By cascade level:");
            for (level, count) in &self.by_level {
                let _ = writeln!(out, "  {}: {}", level, count);
            }
        }

        if !self.by_series.is_empty() {
            let _ = writeln!(out, "By series:");
            let mut series: Vec<_> = self.by_series.iter().collect();
            series.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (name, count) in series {
                let _ = writeln!(out, "  {}: {}", name, count);
            }
        }

        let elapsed = self.finished_at - self.started_at;
        let _ = writeln!(out, "Elapsed: {} ms", elapsed.num_milliseconds());
        out
    }
}

enum Outcome {
    Unresolved,
    Duplicate,
    /// Written or, in a dry run, would be written
    Written((i64, String)),
    WriteFailed,
}

/// Drives resolution and write-back over a listing store
pub struct BatchApplier<C, L> {
    resolver: Resolver<C>,
    listings: L,
    settings: BatchSettings,
}

impl<C: CatalogStore, L: ListingStore> BatchApplier<C, L> {
    pub fn new(resolver: Resolver<C>, listings: L, settings: BatchSettings) -> Self {
        Self {
            resolver,
            listings,
            settings,
        }
    }

    pub fn listings(&self) -> &L {
        &self.listings
    }

    pub fn into_listings(self) -> L {
        self.listings
    }

    /// Run one batch. Only fetching the listings can fail; per-listing errors
    /// are counted in the report.
    pub fn run(&mut self, options: &BatchOptions) -> Result<BatchReport> {
        let profile = self.resolver.extractor().profile().name;
        let mut report = BatchReport::start(profile, options.dry_run);
        let span = info_span!("batch", run_id = %report.run_id, dry_run = options.dry_run);
        let _guard = span.enter();

        let candidates = self.listings.fetch_unresolved(&options.filter())?;
        report.total = candidates.len();
        info!(
            "Processing {} unresolved listings (profile {}{})",
            report.total,
            profile,
            if options.dry_run { ", dry run" } else { "" }
        );

        let checkpoint_size = self.settings.checkpoint_size.max(1);
        let progress_interval = self.settings.progress_interval.max(1);
        let mut staged: HashSet<(i64, String)> = HashSet::new();
        let mut uncommitted: Vec<(i64, String)> = Vec::new();

        for (index, listing) in candidates.iter().enumerate() {
            match self.apply_one(listing, options.dry_run, &staged, &mut report) {
                Outcome::Written(key) => {
                    staged.insert(key.clone());
                    if !options.dry_run {
                        uncommitted.push(key);
                        if uncommitted.len() >= checkpoint_size {
                            self.commit(&mut uncommitted, &mut staged, &mut report);
                        }
                    }
                }
                Outcome::Unresolved => report.unresolved += 1,
                Outcome::Duplicate | Outcome::WriteFailed => {}
            }

            let processed = index + 1;
            if processed % progress_interval == 0 {
                info!(
                    "Progress: {}/{} processed, {} written, {} duplicates, {} unresolved",
                    processed, report.total, report.written, report.duplicates, report.unresolved
                );
            }
        }

        if !options.dry_run {
            self.commit(&mut uncommitted, &mut staged, &mut report);
        }

        report.finished_at = Utc::now();
        info!(
            "Batch finished: {}/{} written ({:.1}%), {} duplicates, {} unresolved, {} write failures, {} lost in failed commits",
            report.written,
            report.total,
            report.success_rate(),
            report.duplicates,
            report.unresolved,
            report.write_failures,
            report.commit_failures
        );
        Ok(report)
    }

    fn apply_one(
        &mut self,
        listing: &ListingRecord,
        dry_run: bool,
        staged: &HashSet<(i64, String)>,
        report: &mut BatchReport,
    ) -> Outcome {
        let Some(resolution) = self.resolver.resolve(&listing.title) else {
            debug!("No match for listing {} '{}'", listing.id, listing.title);
            return Outcome::Unresolved;
        };

        let result = ResolutionResult {
            listing_id: listing.id,
            isbn: resolution.isbn,
            series: resolution.series,
            title: listing.title.clone(),
            level: resolution.level,
        };

        report.resolved += 1;
        *report.by_series.entry(result.series.clone()).or_insert(0) += 1;
        *report.by_level.entry(result.level).or_insert(0) += 1;

        if report.samples.len() < self.settings.sample_size {
            info!(
                "Matched '{}' -> {} (series {}, {})",
                result.title, result.isbn, result.series, result.level
            );
            report.samples.push(result.clone());
        }

        let key = (listing.account_id, result.isbn.clone());
        if staged.contains(&key) || self.already_held(listing, &result.isbn) {
            debug!(
                "Listing {} skipped: account {} already holds {}",
                listing.id, listing.account_id, result.isbn
            );
            report.duplicates += 1;
            return Outcome::Duplicate;
        }

        if !dry_run {
            if let Err(e) = self.listings.assign_isbn(listing.id, &result.isbn) {
                error!("Failed to write {} to listing {}: {}", result.isbn, listing.id, e);
                report.write_failures += 1;
                return Outcome::WriteFailed;
            }
        }

        report.written += 1;
        Outcome::Written(key)
    }

    fn already_held(&self, listing: &ListingRecord, isbn: &str) -> bool {
        match self.listings.count_holding(listing.account_id, isbn, listing.id) {
            Ok(count) => count > 0,
            Err(e) => {
                // Unknown holdings: treat as held so the account never ends up with two
                warn!("Duplicate check failed for listing {}: {}", listing.id, e);
                true
            }
        }
    }

    /// Checkpoint the writes staged since the last successful checkpoint.
    ///
    /// A failed checkpoint discards those writes: they leave `written`, are
    /// counted as commit failures and stop blocking their identifiers.
    fn commit(
        &mut self,
        uncommitted: &mut Vec<(i64, String)>,
        staged: &mut HashSet<(i64, String)>,
        report: &mut BatchReport,
    ) {
        if uncommitted.is_empty() {
            return;
        }

        let count = uncommitted.len();
        match self.listings.checkpoint() {
            Ok(()) => {
                debug!("Checkpoint committed {} writes", count);
                uncommitted.clear();
            }
            Err(e) => {
                error!("Checkpoint failed, {} writes discarded: {}", count, e);
                report.written -= count;
                report.commit_failures += count;
                for key in uncommitted.drain(..) {
                    staged.remove(&key);
                }
            }
        }
    }
}
