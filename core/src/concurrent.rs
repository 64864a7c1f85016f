use crate::index::InvertedIndex;
use crate::lock::SharedLock;
use crate::search::SearchResult;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Thread-safe facade over [`InvertedIndex`]: a lock member plus the same
/// operation set, rather than a parallel subclass hierarchy. Writes take
/// the exclusive guard, reads the shared guard, always for exactly the
/// duration of one call.
///
/// The intended write path is coarse: tasks build a private
/// [`InvertedIndex`] with no synchronization at all and land it with one
/// [`merge_from`](Self::merge_from) call, so the exclusive guard is held
/// for a single O(words-in-document) union instead of once per word.
#[derive(Default)]
pub struct ConcurrentIndex {
    inner: SharedLock<InvertedIndex>,
}

impl ConcurrentIndex {
    pub fn new() -> Self {
        ConcurrentIndex {
            inner: SharedLock::new(InvertedIndex::new()),
        }
    }

    pub fn add(&self, word: &str, location: &str, position: usize) {
        self.inner.write().add(word, location, position);
    }

    /// Absorbs a partial index built outside the lock, under one exclusive
    /// acquisition.
    pub fn merge_from(&self, partial: InvertedIndex) {
        self.inner.write().merge_from(partial);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.inner.read().contains_location(word, location)
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.inner.read().contains_position(word, location, position)
    }

    /// Snapshot of the indexed words. Owned, since borrows cannot outlive
    /// the guard.
    pub fn words(&self) -> Vec<String> {
        self.inner.read().words().map(str::to_string).collect()
    }

    pub fn locations(&self, word: &str) -> Vec<String> {
        self.inner.read().locations(word).map(str::to_string).collect()
    }

    pub fn positions(&self, word: &str, location: &str) -> BTreeSet<usize> {
        self.inner.read().positions(word, location)
    }

    pub fn word_count(&self, location: &str) -> usize {
        self.inner.read().word_count(location)
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.inner.read().counts().clone()
    }

    pub fn exact_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().exact_search(stems)
    }

    pub fn partial_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().partial_search(stems)
    }

    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        self.inner.read().search(stems, exact)
    }

    /// Writes the index as JSON, holding the shared guard while serializing.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        crate::json::write_index(&self.inner.read(), path)
    }

    /// Writes the per-location word counts as JSON.
    pub fn write_counts_json(&self, path: &Path) -> Result<()> {
        crate::json::write_counts(self.inner.read().counts(), path)
    }
}
