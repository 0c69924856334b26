use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use super::data::{matches_query, BookFields, BookRecord, SortKey};
use crate::error::{IndexError, ValidationError};

/// The RecordStore owns the ordered list of books.
///
/// It is shared between the UI and the sort worker (wrap it in an `Arc`).
/// Every operation holds the lock only for its own duration, so a running
/// sort never blocks inserts or searches for longer than a single step.
///
/// At most one sort may run against a store at a time, whichever engine
/// started it; see `try_claim_sort`.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<BookRecord>>,
    sorting: AtomicBool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a book to the end of the list
    pub fn insert(&self, fields: &BookFields) -> Result<BookRecord, ValidationError> {
        let record = BookRecord::from_fields(fields)?;
        self.records.write().push(record.clone());
        log::info!("📚 Added book #{} \"{}\"", record.id, record.title);
        Ok(record)
    }

    /// All records whose id text or title contains `query`, ignoring case, in store order
    pub fn find_matching(&self, query: &str) -> Vec<BookRecord> {
        self.records
            .read()
            .iter()
            .filter(|record| matches_query(record, query))
            .cloned()
            .collect()
    }

    /// Exchange the records at positions `i` and `j`
    pub fn swap_at(&self, i: usize, j: usize) -> Result<(), IndexError> {
        let mut records = self.records.write();
        check_bounds(i, records.len())?;
        check_bounds(j, records.len())?;
        records.swap(i, j);
        Ok(())
    }

    /// Compare the records at `i` and `j` by `key` under a single read lock
    pub fn compare_at(&self, i: usize, j: usize, key: SortKey) -> Result<Ordering, IndexError> {
        let records = self.records.read();
        let a = records.get(i).ok_or(IndexError { index: i, len: records.len() })?;
        let b = records.get(j).ok_or(IndexError { index: j, len: records.len() })?;
        Ok(key.compare(a, b))
    }

    /// A copy of the current list, for rendering
    pub fn snapshot(&self) -> Vec<BookRecord> {
        self.records.read().clone()
    }

    /// Remove every record
    pub fn clear(&self) {
        let mut records = self.records.write();
        log::info!("🗑️  Cleared {} books", records.len());
        records.clear();
    }

    /// Reserve the store for one sort run. Returns `None` if a run already holds it.
    /// The reservation ends when the returned claim is dropped.
    pub fn try_claim_sort(self: &Arc<Self>) -> Option<SortClaim> {
        self.sorting
            .compare_exchange(false, true, AtomicOrdering::AcqRel, AtomicOrdering::Acquire)
            .ok()
            .map(|_| SortClaim {
                store: Arc::clone(self),
            })
    }

    /// True while some sort run holds the store
    pub fn is_sorting(&self) -> bool {
        self.sorting.load(AtomicOrdering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// Exclusive right to sort a `RecordStore`, released on drop
#[derive(Debug)]
pub struct SortClaim {
    store: Arc<RecordStore>,
}

impl Drop for SortClaim {
    fn drop(&mut self) {
        self.store.sorting.store(false, AtomicOrdering::Release);
    }
}

fn check_bounds(index: usize, len: usize) -> Result<(), IndexError> {
    if index < len {
        Ok(())
    } else {
        Err(IndexError { index, len })
    }
}
