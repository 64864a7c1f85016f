use crate::search::SearchResult;
use std::collections::{BTreeMap, BTreeSet};

/// Word-location index: word -> location -> 1-based positions, plus a
/// per-location word count. Locations are opaque strings (file paths or
/// URLs). This type is unsynchronized; worker tasks build private instances
/// of it and merge them into a [`ConcurrentIndex`](crate::ConcurrentIndex).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    index: BTreeMap<String, BTreeMap<String, BTreeSet<usize>>>,
    counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `word` occurs at `position` within `location`.
    ///
    /// The location's word count is raised to `position` when it exceeds the
    /// current value. Positions arriving in increasing order (as the builder
    /// and crawler produce them) therefore leave the count equal to the
    /// number of words scanned; out-of-order inserts can only leave it at
    /// the maximum seen, never lower it.
    pub fn add(&mut self, word: &str, location: &str, position: usize) {
        self.index
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);

        let count = self.counts.entry(location.to_string()).or_insert(0);
        if position > *count {
            *count = position;
        }
    }

    /// Unions another index into this one. Position sets are unioned where
    /// both sides hold the same (word, location) pair and word counts take
    /// the per-location maximum, so merge order never affects the outcome.
    pub fn merge_from(&mut self, other: InvertedIndex) {
        for (word, locations) in other.index {
            let entry = self.index.entry(word).or_default();
            for (location, positions) in locations {
                entry.entry(location).or_default().extend(positions);
            }
        }
        for (location, count) in other.counts {
            let current = self.counts.entry(location).or_insert(0);
            if count > *current {
                *current = count;
            }
        }
    }

    /// Number of distinct words in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.index
            .get(word)
            .map_or(false, |locations| locations.contains_key(location))
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(false, |positions| positions.contains(&position))
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn locations(&self, word: &str) -> impl Iterator<Item = &str> {
        self.index
            .get(word)
            .into_iter()
            .flat_map(|locations| locations.keys().map(String::as_str))
    }

    pub fn positions(&self, word: &str, location: &str) -> BTreeSet<usize> {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .cloned()
            .unwrap_or_default()
    }

    /// Total word occurrences recorded for a location.
    pub fn word_count(&self, location: &str) -> usize {
        self.counts.get(location).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// The nested word -> location -> positions structure, used by the JSON
    /// writer and equality-based tests.
    pub fn entries(&self) -> &BTreeMap<String, BTreeMap<String, BTreeSet<usize>>> {
        &self.index
    }

    /// Occurrences of exactly `word` at `location`.
    fn matches(&self, word: &str, location: &str) -> usize {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(0, BTreeSet::len)
    }

    /// Occurrences at `location` of any indexed word sharing `prefix`.
    fn prefix_matches(&self, prefix: &str, location: &str) -> usize {
        self.prefix_range(prefix)
            .filter_map(|(_, locations)| locations.get(location))
            .map(BTreeSet::len)
            .sum()
    }

    /// Index entries whose word starts with `prefix`, in sorted order. The
    /// scan starts at the lower bound and stops at the first key past the
    /// prefix, so unrelated words are never visited.
    fn prefix_range<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a BTreeMap<String, BTreeSet<usize>>)> {
        self.index
            .range(prefix.to_string()..)
            .take_while(move |(word, _)| word.starts_with(prefix))
    }

    /// Ranked results for locations containing any of the query stems
    /// exactly. Each location appears once; its match count accumulates
    /// occurrences of every query stem.
    pub fn exact_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut used: BTreeSet<&str> = BTreeSet::new();
        let mut results = Vec::new();

        for stem in stems {
            if let Some(locations) = self.index.get(stem) {
                for location in locations.keys() {
                    if used.insert(location) {
                        let count = stems.iter().map(|s| self.matches(s, location)).sum();
                        results.push(SearchResult::new(
                            location.clone(),
                            count,
                            self.word_count(location),
                        ));
                    }
                }
            }
        }

        results.sort();
        results
    }

    /// Ranked results for locations containing any indexed word that starts
    /// with one of the query stems.
    pub fn partial_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut used: BTreeSet<&str> = BTreeSet::new();
        let mut results = Vec::new();

        for stem in stems {
            for (_, locations) in self.prefix_range(stem) {
                for location in locations.keys() {
                    if used.insert(location) {
                        let count = stems.iter().map(|s| self.prefix_matches(s, location)).sum();
                        results.push(SearchResult::new(
                            location.clone(),
                            count,
                            self.word_count(location),
                        ));
                    }
                }
            }
        }

        results.sort();
        results
    }

    /// Dispatches on search type; query tasks call this with their flag.
    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(stems)
        } else {
            self.partial_search(stems)
        }
    }
}
