//! Catalog and listing storage seams
//!
//! The engine only talks to the two traits below. `sqlite` backs them with a
//! database file, `memory` with plain collections.

pub mod memory;
pub mod sqlite;

use crate::engine::cascade::MatchPredicate;
use crate::Result;
use serde::{Deserialize, Serialize};

pub use memory::{MemoryCatalog, MemoryListings};
pub use sqlite::{SqliteCatalog, SqliteListings};

/// Reference book entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub isbn: String,
    pub title: String,
    pub year: Option<i32>,
    pub publisher: Option<String>,
}

/// Product offer that may still lack a catalog identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: i64,
    pub account_id: i64,
    pub title: String,
    pub isbn: Option<String>,
}

impl ListingRecord {
    /// NULL and empty identifiers both count as unresolved
    pub fn is_unresolved(&self) -> bool {
        self.isbn.as_deref().map_or(true, str::is_empty)
    }
}

/// Selection of listings for a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub account_id: Option<i64>,
    pub limit: Option<usize>,
}

/// Read access to the reference catalog
pub trait CatalogStore {
    /// Rows satisfying every condition of the predicate, at most `predicate.limit`,
    /// ordered by ascending ISBN
    fn find(&self, predicate: &MatchPredicate) -> Result<Vec<CatalogRecord>>;
}

/// Read/write access to listings
pub trait ListingStore {
    /// Unresolved listings with a non-empty title, ordered by listing id
    fn fetch_unresolved(&self, filter: &ListingFilter) -> Result<Vec<ListingRecord>>;

    /// Listings in `account_id` holding `isbn`, excluding `exclude_listing_id`.
    /// Uncommitted writes are visible.
    fn count_holding(&self, account_id: i64, isbn: &str, exclude_listing_id: i64) -> Result<u64>;

    /// Stage an identifier for a listing; durable after the next checkpoint
    fn assign_isbn(&mut self, listing_id: i64, isbn: &str) -> Result<()>;

    /// Commit everything staged since the previous checkpoint
    fn checkpoint(&mut self) -> Result<()>;
}
