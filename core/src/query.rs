use crate::concurrent::ConcurrentIndex;
use crate::queue::WorkQueue;
use crate::search::{ResultMap, SearchResult};
use crate::tokenizer::unique_stems;
use anyhow::Result;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Runs query files against a [`ConcurrentIndex`], one pool task per line,
/// collecting results keyed by the normalized query.
///
/// The result map has its own mutex, independent of the index lock: a task
/// claims its key in one critical section (check-and-claim), runs the
/// search with no result-map lock held, and then stores the list. Duplicate
/// query lines are therefore computed at most once.
pub struct QueryParser {
    index: Arc<ConcurrentIndex>,
    results: Arc<Mutex<ResultMap>>,
}

impl QueryParser {
    pub fn new(index: Arc<ConcurrentIndex>) -> Self {
        QueryParser {
            index,
            results: Arc::new(Mutex::new(ResultMap::new())),
        }
    }

    /// Submits one search task per line of `path`, then waits for the pool
    /// to drain.
    pub fn parse_query_file(&self, path: &Path, exact: bool, queue: &WorkQueue) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            let index = self.index.clone();
            let results = self.results.clone();
            queue.execute(move || parse_query_line(&index, &results, &line, exact));
        }

        queue.finish();
        Ok(())
    }

    /// Runs a single query line synchronously on the calling thread.
    pub fn parse_query_line(&self, line: &str, exact: bool) {
        parse_query_line(&self.index, &self.results, line, exact);
    }

    pub fn has_query(&self, query: &str) -> bool {
        self.results.lock().contains_key(query)
    }

    pub fn results_for(&self, query: &str) -> Option<Vec<SearchResult>> {
        self.results.lock().get(query).cloned()
    }

    /// Snapshot of the whole result collection.
    pub fn results(&self) -> ResultMap {
        self.results.lock().clone()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        crate::json::write_results(&self.results.lock(), path)
    }
}

fn parse_query_line(
    index: &ConcurrentIndex,
    results: &Mutex<ResultMap>,
    line: &str,
    exact: bool,
) {
    let stems = unique_stems(line);
    if stems.is_empty() {
        return;
    }
    let query = stems.iter().cloned().collect::<Vec<_>>().join(" ");

    // Claim the key before searching so a duplicate line becomes a no-op.
    {
        let mut map = results.lock();
        if map.contains_key(&query) {
            return;
        }
        map.insert(query.clone(), Vec::new());
    }

    let hits = index.search(&stems, exact);
    results.lock().insert(query, hits);
}
