use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One ranked hit: a location, how many query matches it held, and the
/// fraction of its words that matched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "where")]
    pub location: String,
    pub count: usize,
    pub score: f64,
}

/// Search results keyed by normalized query (space-joined sorted unique
/// stems), one entry per distinct query line.
pub type ResultMap = BTreeMap<String, Vec<SearchResult>>;

impl SearchResult {
    pub fn new(location: String, count: usize, total_words: usize) -> Self {
        let score = if total_words == 0 {
            0.0
        } else {
            count as f64 / total_words as f64
        };
        SearchResult { location, count, score }
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchResult {
    /// Higher score first, then higher count, then location ascending
    /// ignoring case. Scores are finite ratios, so `total_cmp` is a true
    /// total order here.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| {
                self.location
                    .to_lowercase()
                    .cmp(&other.location.to_lowercase())
            })
    }
}
