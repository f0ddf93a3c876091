use super::{CatalogRecord, CatalogStore, ListingFilter, ListingRecord, ListingStore};
use crate::engine::cascade::MatchPredicate;
use crate::engine::conditions::SqlParam;
use crate::{MatcherError, Result};
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::path::Path;
use tracing::{debug, info, warn};

const BOOKS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS books (
    isbn TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    year INTEGER,
    publisher_name TEXT
);
CREATE INDEX IF NOT EXISTS idx_books_year ON books(year);";

const LISTINGS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    product_name TEXT,
    isbn TEXT
);
CREATE INDEX IF NOT EXISTS idx_listings_account_isbn ON listings(account_id, isbn);";

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            SqlParam::Int(i) => Ok(ToSqlOutput::from(*i)),
        }
    }
}

fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).map_err(|e| {
        MatcherError::Store(format!("Failed to open database {}: {}", path.display(), e))
    })?;
    conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
    Ok(conn)
}

/// Catalog backed by the `books` table
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    pub fn open(path: &Path) -> Result<Self> {
        let catalog = Self { conn: open(path)? };
        debug!("Opened catalog database {}", path.display());
        Ok(catalog)
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Create the `books` table if it does not exist
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(BOOKS_SCHEMA)?;
        Ok(())
    }

    /// Insert or replace a catalog row
    pub fn insert(&self, record: &CatalogRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO books (isbn, title, year, publisher_name) VALUES (?1, ?2, ?3, ?4)",
            params![record.isbn, record.title, record.year, record.publisher],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl CatalogStore for SqliteCatalog {
    fn find(&self, predicate: &MatchPredicate) -> Result<Vec<CatalogRecord>> {
        let (query, params) = predicate.to_sql();
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(CatalogRecord {
                isbn: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                publisher: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Listings backed by the `listings` table.
///
/// Writes open a transaction that stays open until `checkpoint`; dropping the
/// store without a checkpoint rolls the pending writes back.
pub struct SqliteListings {
    conn: Connection,
}

impl SqliteListings {
    pub fn open(path: &Path) -> Result<Self> {
        let listings = Self { conn: open(path)? };
        debug!("Opened listing database {}", path.display());
        Ok(listings)
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Create the `listings` table if it does not exist
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(LISTINGS_SCHEMA)?;
        Ok(())
    }

    pub fn insert(&self, listing: &ListingRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO listings (id, account_id, product_name, isbn) VALUES (?1, ?2, ?3, ?4)",
            params![listing.id, listing.account_id, listing.title, listing.isbn],
        )?;
        Ok(())
    }

    /// Current identifier of a listing, `None` when unset or the listing is missing
    pub fn isbn_of(&self, listing_id: i64) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT isbn FROM listings WHERE id = ?1")?;
        let mut rows = stmt.query(params![listing_id])?;
        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(None),
        }
    }

    /// True while writes are waiting for a checkpoint
    pub fn has_pending_writes(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl ListingStore for SqliteListings {
    fn fetch_unresolved(&self, filter: &ListingFilter) -> Result<Vec<ListingRecord>> {
        let mut query = String::from(
            "SELECT id, account_id, product_name, isbn FROM listings
             WHERE (isbn IS NULL OR isbn = '')
               AND product_name IS NOT NULL
               AND product_name != ''",
        );
        let mut params: Vec<SqlParam> = Vec::new();

        if let Some(account_id) = filter.account_id {
            query.push_str(" AND account_id = ?");
            params.push(SqlParam::Int(account_id));
        }

        query.push_str(" ORDER BY id");

        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            params.push(SqlParam::Int(limit as i64));
        }

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(ListingRecord {
                id: row.get(0)?,
                account_id: row.get(1)?,
                title: row.get(2)?,
                isbn: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn count_holding(&self, account_id: i64, isbn: &str, exclude_listing_id: i64) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM listings WHERE account_id = ?1 AND isbn = ?2 AND id != ?3",
            params![account_id, isbn, exclude_listing_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn assign_isbn(&mut self, listing_id: i64, isbn: &str) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }

        let changed = self.conn.execute(
            "UPDATE listings SET isbn = ?1 WHERE id = ?2",
            params![isbn, listing_id],
        )?;

        if changed == 0 {
            return Err(MatcherError::Store(format!(
                "Listing {} not found",
                listing_id
            )));
        }
        Ok(())
    }

    /// Commit the open transaction; a failed commit is rolled back so the
    /// staged writes are gone either way
    fn checkpoint(&mut self) -> Result<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            if !self.conn.is_autocommit() {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    warn!("Rollback after failed commit also failed: {}", rollback);
                }
            }
            return Err(e.into());
        }
        info!("Checkpoint committed");
        Ok(())
    }
}
