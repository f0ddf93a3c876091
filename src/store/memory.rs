use super::{CatalogRecord, CatalogStore, ListingFilter, ListingRecord, ListingStore};
use crate::engine::cascade::MatchPredicate;
use crate::{MatcherError, Result};
use std::collections::{BTreeMap, HashSet};

/// Catalog held in memory, kept sorted by ISBN
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: Vec<CatalogRecord>,
}

impl MemoryCatalog {
    pub fn new(mut records: Vec<CatalogRecord>) -> Self {
        records.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CatalogStore for MemoryCatalog {
    fn find(&self, predicate: &MatchPredicate) -> Result<Vec<CatalogRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| predicate.matches(record))
            .take(predicate.limit)
            .cloned()
            .collect())
    }
}

/// Listings held in memory.
///
/// Committed rows and writes staged since the last checkpoint are kept apart,
/// mirroring a database transaction.
#[derive(Debug, Clone, Default)]
pub struct MemoryListings {
    committed: BTreeMap<i64, ListingRecord>,
    pending: BTreeMap<i64, String>,
    checkpoints: usize,
    failing_writes: HashSet<i64>,
    checkpoint_attempts: usize,
    failing_checkpoints: HashSet<usize>,
}

impl MemoryListings {
    pub fn new(listings: Vec<ListingRecord>) -> Self {
        Self {
            committed: listings.into_iter().map(|l| (l.id, l)).collect(),
            ..Default::default()
        }
    }

    /// Make writes to `listing_id` fail
    pub fn with_failing_write(mut self, listing_id: i64) -> Self {
        self.failing_writes.insert(listing_id);
        self
    }

    /// Make the `attempt`-th checkpoint with staged writes fail (1-based),
    /// discarding those writes as a rollback would
    pub fn with_failing_checkpoint(mut self, attempt: usize) -> Self {
        self.failing_checkpoints.insert(attempt);
        self
    }

    /// Committed state of a listing
    pub fn get(&self, listing_id: i64) -> Option<&ListingRecord> {
        self.committed.get(&listing_id)
    }

    /// All committed listings ordered by id
    pub fn listings(&self) -> impl Iterator<Item = &ListingRecord> {
        self.committed.values()
    }

    /// Number of checkpoints that committed at least one write
    pub fn checkpoints(&self) -> usize {
        self.checkpoints
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    fn current_isbn(&self, listing: &ListingRecord) -> Option<String> {
        self.pending
            .get(&listing.id)
            .cloned()
            .or_else(|| listing.isbn.clone())
    }
}

impl ListingStore for MemoryListings {
    fn fetch_unresolved(&self, filter: &ListingFilter) -> Result<Vec<ListingRecord>> {
        let selected = self
            .committed
            .values()
            .filter(|l| l.is_unresolved() && !l.title.is_empty())
            .filter(|l| filter.account_id.map_or(true, |id| l.account_id == id))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(selected)
    }

    fn count_holding(&self, account_id: i64, isbn: &str, exclude_listing_id: i64) -> Result<u64> {
        let count = self
            .committed
            .values()
            .filter(|l| l.account_id == account_id && l.id != exclude_listing_id)
            .filter(|l| self.current_isbn(l).as_deref() == Some(isbn))
            .count();
        Ok(count as u64)
    }

    fn assign_isbn(&mut self, listing_id: i64, isbn: &str) -> Result<()> {
        if self.failing_writes.contains(&listing_id) {
            return Err(MatcherError::Store(format!(
                "Write rejected for listing {}",
                listing_id
            )));
        }
        if !self.committed.contains_key(&listing_id) {
            return Err(MatcherError::Store(format!(
                "Listing {} not found",
                listing_id
            )));
        }
        self.pending.insert(listing_id, isbn.to_string());
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.checkpoint_attempts += 1;
        if self.failing_checkpoints.contains(&self.checkpoint_attempts) {
            let discarded = std::mem::take(&mut self.pending).len();
            return Err(MatcherError::Store(format!(
                "Commit rejected, {} writes rolled back",
                discarded
            )));
        }
        for (listing_id, isbn) in std::mem::take(&mut self.pending) {
            if let Some(listing) = self.committed.get_mut(&listing_id) {
                listing.isbn = Some(isbn);
            }
        }
        self.checkpoints += 1;
        Ok(())
    }
}
