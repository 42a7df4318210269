//! Index building and offline rebuild
//!
//! `index.json` is the list of every indexed page sorted by title;
//! `by-type.json` is the same list grouped by classification tag.

use crate::classify::classify_local;
use crate::storage::{IndexEntry, Storage, StorageResult};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Accumulates index entries keyed by slug
///
/// Entries inserted later replace earlier ones with the same slug, so a run
/// seeded with a previous index keeps pages it did not revisit.
#[derive(Debug, Default, Clone)]
pub struct IndexBuilder {
    entries: BTreeMap<String, IndexEntry>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the builder with entries from a previous run
    pub fn from_existing(entries: Vec<IndexEntry>) -> Self {
        let mut builder = Self::new();
        for entry in entries {
            builder.insert(entry);
        }
        builder
    }

    pub fn insert(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.slug.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns every entry in index order
    pub fn sorted(&self) -> Vec<IndexEntry> {
        let mut list: Vec<IndexEntry> = self.entries.values().cloned().collect();
        sort_entries(&mut list);
        list
    }
}

/// Sorts entries by case-insensitive title, then raw title, then slug
pub fn sort_entries(entries: &mut [IndexEntry]) {
    entries.sort_by(compare_entries);
}

fn compare_entries(a: &IndexEntry, b: &IndexEntry) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.slug.cmp(&b.slug))
}

/// Groups sorted entries by classification tag, keeping their order
pub fn group_by_type(entries: &[IndexEntry]) -> BTreeMap<String, Vec<IndexEntry>> {
    let mut groups: BTreeMap<String, Vec<IndexEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.page_type.as_str().to_string())
            .or_default()
            .push(entry.clone());
    }
    groups
}

/// Writes both indexes from an unsorted entry list
///
/// # Returns
///
/// The number of entries written
pub fn write_indexes<S: Storage>(storage: &mut S, mut entries: Vec<IndexEntry>) -> StorageResult<usize> {
    sort_entries(&mut entries);
    let by_type = group_by_type(&entries);
    storage.save_indexes(&entries, &by_type)?;
    Ok(entries.len())
}

/// Reconstructs both indexes from stored page records alone
///
/// Records without a classification tag are classified from their title and
/// slug. No network access is involved.
///
/// # Returns
///
/// The number of entries written
pub fn rebuild_index<S: Storage>(storage: &mut S) -> StorageResult<usize> {
    let records = storage.load_pages()?;
    tracing::info!("Rebuilding index from {} page records", records.len());

    let mut builder = IndexBuilder::new();
    for record in &records {
        let page_type = record
            .page_type
            .unwrap_or_else(|| classify_local(&record.title, &record.slug));
        builder.insert(IndexEntry::from_record(record, page_type));
    }

    write_indexes(storage, builder.sorted())
}
