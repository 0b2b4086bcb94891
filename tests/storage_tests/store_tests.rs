//! Tests for Store
//!
//! These tests verify:
//! - Opening/creating the active file
//! - Append and insertion-order scans
//! - First-match lookups, including duplicate ids
//! - In-place updates
//! - Capacity limit
//! - Record count initialization on reopen

use std::fs;

use flatbook::config::{CountOnOpen, StoreConfig, StoreConfigBuilder, TitleOverflow};
use flatbook::{Book, FlatbookError, Store};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open_path(temp_dir.path()).unwrap();
    (temp_dir, store)
}

fn setup_store_with(
    temp_dir: &TempDir,
    build: impl FnOnce(StoreConfigBuilder) -> StoreConfigBuilder,
) -> Store {
    let config = build(StoreConfig::builder().data_dir(temp_dir.path()))
        .build()
        .unwrap();
    Store::open(config).unwrap()
}

fn reference_books() -> Vec<Book> {
    vec![
        Book::new(20, "Wild", 2012, 12.15),
        Book::new(1, "Wild and Free", 2016, 9.89),
        Book::new(3, "Into the Wild", 1997, 11.49),
        Book::new(44, "The Wild Truth", 2015, 11.68),
        Book::new(50, "The Sound of a Wild Snail Eating", 2016, 12.25),
    ]
}

fn ids(books: &[Book]) -> Vec<i32> {
    books.iter().map(|b| b.id).collect()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_directory_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("library");

    let store = Store::open_path(&data_dir).unwrap();

    assert!(data_dir.is_dir());
    assert!(data_dir.join("Books.dat").is_file());
    assert_eq!(store.path(), data_dir.join("Books.dat"));
    assert!(store.is_open());
}

#[test]
fn test_open_empty_store() {
    let (_temp, mut store) = setup_temp_store();

    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.record_size(), 0);
    assert!(store.scan().unwrap().is_empty());
}

// =============================================================================
// Add / Scan Tests
// =============================================================================

#[test]
fn test_add_and_scan_preserves_insertion_order() {
    let (_temp, mut store) = setup_temp_store();

    for book in reference_books() {
        store.add(&book).unwrap();
    }

    let scanned = store.scan().unwrap();
    assert_eq!(ids(&scanned), vec![20, 1, 3, 44, 50]);
    assert_eq!(store.len(), 5);
}

#[test]
fn test_add_establishes_record_size() {
    let (_temp, mut store) = setup_temp_store();

    store.add(&Book::new(1, "One", 2001, 1.0)).unwrap();
    assert_eq!(store.record_size(), 112);

    store.add(&Book::new(2, "Two", 2002, 2.0)).unwrap();
    let len = fs::metadata(store.path()).unwrap().len();
    assert_eq!(len, 2 * 112);
}

#[test]
fn test_records_are_contiguous_fixed_blocks() {
    let (_temp, mut store) = setup_temp_store();
    store.add(&Book::new(0x11, "A", 1, 1.0)).unwrap();
    store.add(&Book::new(0x22, "B", 2, 2.0)).unwrap();
    store.sync().unwrap();

    let bytes = fs::read(store.path()).unwrap();
    assert_eq!(&bytes[0..4], &0x11i32.to_be_bytes());
    assert_eq!(&bytes[112..116], &0x22i32.to_be_bytes());
}

#[test]
fn test_add_allows_duplicate_ids() {
    let (_temp, mut store) = setup_temp_store();

    store.add(&Book::new(7, "First", 2001, 1.0)).unwrap();
    store.add(&Book::new(7, "Second", 2002, 2.0)).unwrap();

    assert_eq!(store.len(), 2);
}

#[test]
fn test_iter_yields_each_record_once() {
    let (_temp, mut store) = setup_temp_store();
    for book in reference_books() {
        store.add(&book).unwrap();
    }

    let titles: Vec<String> = store
        .iter()
        .unwrap()
        .map(|r| r.unwrap().display_title().to_string())
        .collect();

    assert_eq!(titles.len(), 5);
    assert_eq!(titles[4], "The Sound of a Wild Snail Eating");
}

// =============================================================================
// Find Tests
// =============================================================================

#[test]
fn test_find_existing() {
    let (_temp, mut store) = setup_temp_store();
    for book in reference_books() {
        store.add(&book).unwrap();
    }

    let book = store.find(44).unwrap().unwrap();
    assert_eq!(book.display_title(), "The Wild Truth");
    assert_eq!(book.year, 2015);
    assert_eq!(book.price, 11.68);
}

#[test]
fn test_find_missing() {
    let (_temp, mut store) = setup_temp_store();
    for book in reference_books() {
        store.add(&book).unwrap();
    }

    assert!(store.find(999).unwrap().is_none());
}

#[test]
fn test_find_on_empty_store() {
    let (_temp, mut store) = setup_temp_store();
    assert!(store.find(1).unwrap().is_none());
}

#[test]
fn test_find_returns_first_duplicate() {
    let (_temp, mut store) = setup_temp_store();

    store.add(&Book::new(7, "First", 2001, 1.0)).unwrap();
    store.add(&Book::new(8, "Other", 2003, 3.0)).unwrap();
    store.add(&Book::new(7, "Second", 2002, 2.0)).unwrap();

    assert_eq!(store.find(7).unwrap().unwrap().display_title(), "First");
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_title_in_place() {
    let (_temp, mut store) = setup_temp_store();
    for book in reference_books() {
        store.add(&book).unwrap();
    }
    let len_before = fs::metadata(store.path()).unwrap().len();

    let mut book = store.find(3).unwrap().unwrap();
    book.title = "Not Into the Wild".to_string();
    let previous = store.update(&book).unwrap().unwrap();

    assert_eq!(previous.display_title(), "Into the Wild");

    let updated = store.find(3).unwrap().unwrap();
    assert_eq!(updated.display_title(), "Not Into the Wild");
    assert_eq!(updated.price, 11.49);
    assert_eq!(updated.year, 1997);

    assert_eq!(ids(&store.scan().unwrap()), vec![20, 1, 3, 44, 50]);
    assert_eq!(store.len(), 5);
    assert_eq!(fs::metadata(store.path()).unwrap().len(), len_before);
}

#[test]
fn test_update_leaves_other_blocks_untouched() {
    let (_temp, mut store) = setup_temp_store();
    for book in reference_books() {
        store.add(&book).unwrap();
    }
    store.sync().unwrap();
    let before = fs::read(store.path()).unwrap();

    store.update(&Book::new(44, "Changed", 2020, 1.0)).unwrap();
    store.sync().unwrap();
    let after = fs::read(store.path()).unwrap();

    // Record 3 (id 44) lives at [336, 448)
    assert_eq!(&before[..336], &after[..336]);
    assert_ne!(&before[336..448], &after[336..448]);
    assert_eq!(&before[448..], &after[448..]);
}

#[test]
fn test_update_missing_is_noop() {
    let (_temp, mut store) = setup_temp_store();
    for book in reference_books() {
        store.add(&book).unwrap();
    }
    store.sync().unwrap();
    let before = fs::read(store.path()).unwrap();

    let result = store.update(&Book::new(999, "Ghost", 1900, 0.0)).unwrap();

    assert!(result.is_none());
    store.sync().unwrap();
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_update_only_first_duplicate() {
    let (_temp, mut store) = setup_temp_store();
    store.add(&Book::new(7, "First", 2001, 1.0)).unwrap();
    store.add(&Book::new(7, "Second", 2002, 2.0)).unwrap();

    store.update(&Book::new(7, "Replaced", 2010, 5.0)).unwrap();

    let titles: Vec<String> = store
        .scan()
        .unwrap()
        .iter()
        .map(|b| b.display_title().to_string())
        .collect();
    assert_eq!(titles, vec!["Replaced", "Second"]);
}

#[test]
fn test_update_rejected_title_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = setup_store_with(&temp_dir, |b| {
        b.title_width(8).title_overflow(TitleOverflow::Reject)
    });
    store.add(&Book::new(1, "Short", 2000, 1.0)).unwrap();

    let result = store.update(&Book::new(1, "Much too long", 2000, 1.0));

    assert!(matches!(result, Err(FlatbookError::FieldOverflow { .. })));
    assert_eq!(store.find(1).unwrap().unwrap().display_title(), "Short");
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_add_beyond_capacity() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = setup_store_with(&temp_dir, |b| b.max_records(3));

    for id in 0..3 {
        store.add(&Book::new(id, "Book", 2000, 1.0)).unwrap();
    }
    store.sync().unwrap();
    let before = fs::read(store.path()).unwrap();

    let result = store.add(&Book::new(99, "Overflow", 2000, 1.0));

    assert!(matches!(
        result,
        Err(FlatbookError::CapacityExceeded { max: 3 })
    ));
    assert_eq!(store.len(), 3);
    assert!(store.find(99).unwrap().is_none());
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_default_capacity_is_one_thousand() {
    let (_temp, mut store) = setup_temp_store();

    for id in 0..1000 {
        store.add(&Book::new(id, "Bulk", 2000, 1.0)).unwrap();
    }
    assert!(store.add(&Book::new(1000, "Bulk", 2000, 1.0)).is_err());
    assert_eq!(store.len(), 1000);
}

// =============================================================================
// Reopen Tests
// =============================================================================

#[test]
fn test_reopen_derives_count_from_file_size() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut store = Store::open_path(temp_dir.path()).unwrap();
        for book in reference_books() {
            store.add(&book).unwrap();
        }
        store.close().unwrap();
    }

    let mut store = Store::open_path(temp_dir.path()).unwrap();

    assert_eq!(store.len(), 5);
    assert_eq!(store.record_size(), 112);
    assert_eq!(ids(&store.scan().unwrap()), vec![20, 1, 3, 44, 50]);

    store.add(&Book::new(60, "Sixty", 2020, 6.0)).unwrap();
    assert_eq!(store.len(), 6);
    assert_eq!(store.find(60).unwrap().unwrap().year, 2020);
}

#[test]
fn test_reopen_with_zero_count_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut store = Store::open_path(temp_dir.path()).unwrap();
        for book in reference_books() {
            store.add(&book).unwrap();
        }
        store.close().unwrap();
    }

    let mut store = setup_store_with(&temp_dir, |b| b.count_on_open(CountOnOpen::Zero));

    assert_eq!(store.len(), 0);
    assert!(store.find(20).unwrap().is_none());

    // The next add overwrites the first block
    store.add(&Book::new(99, "Fresh", 2024, 1.0)).unwrap();
    assert_eq!(ids(&store.scan().unwrap()), vec![99]);
    assert_eq!(fs::metadata(store.path()).unwrap().len(), 5 * 112);
}

#[test]
fn test_reopen_misaligned_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("Books.dat"), [0u8; 113]).unwrap();

    let result = Store::open_path(temp_dir.path());

    assert!(matches!(
        result,
        Err(FlatbookError::MisalignedFile {
            len: 113,
            record_size: 112
        })
    ));
}

#[test]
fn test_custom_file_name_and_width() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = setup_store_with(&temp_dir, |b| {
        b.base_name("Novels").extension("bin").title_width(10)
    });

    store.add(&Book::new(1, "A very long novel title", 1999, 5.0)).unwrap();

    assert!(temp_dir.path().join("Novels.bin").is_file());
    assert_eq!(store.record_size(), 4 + 20 + 8 + 4);
    assert_eq!(store.find(1).unwrap().unwrap().title, "A very lon");
}

#[test]
fn test_open_rejects_oversized_width_without_builder() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig {
        data_dir: temp_dir.path().to_path_buf(),
        title_width: usize::MAX / 2 + 1,
        ..StoreConfig::default()
    };

    assert!(matches!(
        Store::open(config),
        Err(FlatbookError::Config(_))
    ));
}

// =============================================================================
// Truncated File Tests
// =============================================================================

#[test]
fn test_scan_stops_at_truncated_record() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut store = Store::open_path(temp_dir.path()).unwrap();
        for book in reference_books() {
            store.add(&book).unwrap();
        }
        store.close().unwrap();
    }

    let mut store = Store::open_path(temp_dir.path()).unwrap();
    // Cut the file mid-way through the fourth record
    let file = fs::OpenOptions::new()
        .write(true)
        .open(store.path())
        .unwrap();
    file.set_len(3 * 112 + 40).unwrap();
    drop(file);

    let results: Vec<_> = store.iter().unwrap().collect();
    assert_eq!(results.len(), 4);
    assert!(results[..3].iter().all(|r| r.is_ok()));
    assert!(matches!(
        results[3],
        Err(FlatbookError::TruncatedRecord {
            expected: 112,
            found: 40
        })
    ));

    assert!(store.scan().is_err());
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_persists_records() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = Store::open_path(temp_dir.path()).unwrap();
    store.add(&Book::new(1, "One", 2001, 1.0)).unwrap();
    let path = store.path().to_path_buf();

    store.close().unwrap();

    assert_eq!(fs::metadata(path).unwrap().len(), 112);
}
