//! End-to-end batch runs against SQLite databases

use isbn_matcher::config::{BatchSettings, MatcherProfile, ProfileName, RootConfig};
use isbn_matcher::engine::{BatchApplier, BatchOptions, CascadeLevel, Extractor, Resolver};
use isbn_matcher::store::{
    CatalogRecord, ListingFilter, ListingRecord, ListingStore, SqliteCatalog, SqliteListings,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;

fn book(isbn: &str, title: &str, year: Option<i32>) -> CatalogRecord {
    CatalogRecord {
        isbn: isbn.to_string(),
        title: title.to_string(),
        year,
        publisher: Some("테스트출판".to_string()),
    }
}

fn listing(id: i64, account_id: i64, title: &str, isbn: Option<&str>) -> ListingRecord {
    ListingRecord {
        id,
        account_id,
        title: title.to_string(),
        isbn: isbn.map(str::to_string),
    }
}

fn seed(path: &Path, books: &[CatalogRecord], listings: &[ListingRecord]) {
    let catalog = SqliteCatalog::open(path).unwrap();
    catalog.ensure_schema().unwrap();
    for record in books {
        catalog.insert(record).unwrap();
    }

    let store = SqliteListings::open(path).unwrap();
    store.ensure_schema().unwrap();
    for record in listings {
        store.insert(record).unwrap();
    }
}

fn applier(
    path: &Path,
    profile: ProfileName,
    settings: BatchSettings,
) -> BatchApplier<SqliteCatalog, SqliteListings> {
    let resolver = Resolver::from_config(
        SqliteCatalog::open(path).unwrap(),
        &RootConfig::default(),
        MatcherProfile::preset(profile),
    );
    BatchApplier::new(resolver, SqliteListings::open(path).unwrap(), settings)
}

#[test]
fn test_cascade_levels_against_sqlite() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("catalog.db");
    seed(
        &db,
        &[
            book("9791100000010", "오투 중등 과학 중2 2-1", Some(2027)),
            book("9791100000020", "오투 개념서", Some(2019)),
            book("9791100000030", "자이스토리 고등 수학 고2", None),
        ],
        &[],
    );

    let resolver = Resolver::from_config(
        SqliteCatalog::open(&db).unwrap(),
        &RootConfig::default(),
        MatcherProfile::default(),
    );

    let exact = resolver.resolve("[오투] 중등 2 과학 2-1 2026").unwrap();
    assert_eq!(exact.isbn, "9791100000010");
    assert_eq!(exact.level, CascadeLevel::SeriesGradeSubjectTermYear);

    // Year outside the window drops to the next level
    let loose = resolver.resolve("[오투] 중등 2 과학 2-1 2030").unwrap();
    assert_eq!(loose.level, CascadeLevel::SeriesGradeSubjectTerm);

    // Ties resolve to the smallest ISBN
    let series_only = resolver.resolve("오투 (사은품)").unwrap();
    assert_eq!(series_only.isbn, "9791100000010");
    assert_eq!(series_only.level, CascadeLevel::Series);

    let aliased = resolver.resolve("Xistory 고2 수학").unwrap();
    assert_eq!(aliased.series, "자이스토리");
    assert_eq!(aliased.level, CascadeLevel::SeriesGradeSubject);

    assert_eq!(resolver.resolve("완자 물리"), None);
}

#[test]
fn test_like_wildcards_are_literal() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("catalog.db");
    seed(&db, &[book("9791100000040", "한끝 중등 국어", None)], &[]);

    let resolver = Resolver::from_config(
        SqliteCatalog::open(&db).unwrap(),
        &RootConfig {
            series: vec!["한%".to_string()],
            ..Default::default()
        },
        MatcherProfile::default(),
    );
    assert_eq!(resolver.resolve("한% 국어"), None);
}

#[test]
fn test_live_batch_checkpoints_and_skips_duplicates() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("shop.db");

    let mut listings: Vec<ListingRecord> = (1..=12)
        .map(|id| listing(id, id, "쎈 중등 수학 1-1", None))
        .collect();
    // Account 1 already holds the identifier through another listing
    listings.push(listing(100, 1, "쎈 수학", Some("9791100000050")));
    // Two unresolved listings of one account compete for the same identifier
    listings.push(listing(200, 50, "쎈 수학", None));
    listings.push(listing(201, 50, "쎈 수학 세트", None));

    seed(
        &db,
        &[book("9791100000050", "신사고 쎈 중등 수학 1-1", Some(2025))],
        &listings,
    );

    let settings = BatchSettings {
        checkpoint_size: 5,
        ..Default::default()
    };
    let mut applier = applier(&db, ProfileName::Ultra, settings);
    let report = applier.run(&BatchOptions::default()).unwrap();

    assert_eq!(report.total, 14);
    assert_eq!(report.resolved, 14);
    assert_eq!(report.duplicates, 2);
    assert_eq!(report.written, 12);
    assert!(!applier.listings().has_pending_writes());
    drop(applier);

    let store = SqliteListings::open(&db).unwrap();
    assert_eq!(store.isbn_of(1).unwrap(), None);
    assert_eq!(store.isbn_of(2).unwrap().as_deref(), Some("9791100000050"));
    assert_eq!(store.isbn_of(200).unwrap().as_deref(), Some("9791100000050"));
    assert_eq!(store.isbn_of(201).unwrap(), None);

    for account in [1, 50] {
        assert_eq!(store.count_holding(account, "9791100000050", -1).unwrap(), 1);
    }
}

#[test]
fn test_dry_run_parity_on_sqlite() {
    let books = [
        book("9791100000060", "마더텅 수능기출 국어", None),
        book("9791100000070", "완자 중등 과학 중1 1-1", Some(2025)),
    ];
    let listings = [
        listing(1, 1, "마더텅 국어", None),
        listing(2, 1, "마더텅 국어 2026", None),
        listing(3, 2, "완자 중1 과학 1-1 2025", None),
        listing(4, 2, "모르는 책", None),
        listing(5, 3, "", None),
    ];

    let temp = TempDir::new().unwrap();
    let dry_db = temp.path().join("dry.db");
    let live_db = temp.path().join("live.db");
    seed(&dry_db, &books, &listings);
    seed(&live_db, &books, &listings);

    let dry = applier(&dry_db, ProfileName::Aggressive, BatchSettings::default())
        .run(&BatchOptions {
            dry_run: true,
            ..Default::default()
        })
        .unwrap();
    let live = applier(&live_db, ProfileName::Aggressive, BatchSettings::default())
        .run(&BatchOptions::default())
        .unwrap();

    assert!(dry.same_counts(&live));
    assert_eq!(dry.total, 4);
    assert_eq!(dry.duplicates, 1);
    assert_eq!(dry.written, 2);

    let untouched = SqliteListings::open(&dry_db).unwrap();
    assert_eq!(
        untouched
            .fetch_unresolved(&ListingFilter::default())
            .unwrap()
            .len(),
        4
    );

    let written = SqliteListings::open(&live_db).unwrap();
    let remaining: HashSet<i64> = written
        .fetch_unresolved(&ListingFilter::default())
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(remaining, HashSet::from([2, 4]));
}

#[test]
fn test_uncommitted_writes_roll_back() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("shop.db");
    seed(&db, &[], &[listing(1, 1, "쎈 수학", None)]);

    {
        let mut store = SqliteListings::open(&db).unwrap();
        store.assign_isbn(1, "9791100000080").unwrap();
        assert!(store.has_pending_writes());
    }

    let store = SqliteListings::open(&db).unwrap();
    assert_eq!(store.isbn_of(1).unwrap(), None);
}
