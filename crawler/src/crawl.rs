use crate::clean;
use crate::fetch::Fetch;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use stemdex::tokenizer::stem_line;
use stemdex::{ConcurrentIndex, InvertedIndex, WorkQueue};
use url::Url;

/// Bounded, deduplicating crawler. Every page is one pool task: fetch,
/// harvest links into new tasks, then index the page text into the shared
/// index through a private partial index, exactly like the file builder.
///
/// The visited set is the cap: a URL enters it atomically with being
/// scheduled and never leaves, so however many tasks race on the same link,
/// one wins, and no link is claimed once `limit` URLs are taken.
pub struct WebCrawler {
    state: Arc<CrawlState>,
}

struct CrawlState {
    index: Arc<ConcurrentIndex>,
    fetcher: Arc<dyn Fetch>,
    visited: Mutex<HashSet<String>>,
    limit: usize,
}

impl WebCrawler {
    /// `limit` caps the total URLs ever scheduled, the seed included.
    pub fn new(index: Arc<ConcurrentIndex>, fetcher: Arc<dyn Fetch>, limit: usize) -> Self {
        WebCrawler {
            state: Arc::new(CrawlState {
                index,
                fetcher,
                visited: Mutex::new(HashSet::new()),
                limit: limit.max(1),
            }),
        }
    }

    /// Crawls from `seed` and returns once the pool is quiescent, meaning
    /// no crawl task is queued or running anywhere.
    pub fn crawl(&self, seed: Url, queue: &Arc<WorkQueue>) {
        let seed = normalize(seed);
        self.state.visited.lock().insert(seed.to_string());
        tracing::debug!(%seed, limit = self.state.limit, "starting crawl");
        CrawlState::submit(self.state.clone(), seed, queue.clone());
        queue.finish();
    }

    /// URLs claimed so far; never exceeds the configured limit.
    pub fn visited_count(&self) -> usize {
        self.state.visited.lock().len()
    }

    pub fn visited(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.state.visited.lock().iter().cloned().collect();
        urls.sort();
        urls
    }
}

fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

impl CrawlState {
    fn submit(state: Arc<CrawlState>, url: Url, queue: Arc<WorkQueue>) {
        let worker_queue = queue.clone();
        queue.execute(move || state.process(&url, &worker_queue));
    }

    fn process(self: &Arc<Self>, url: &Url, queue: &Arc<WorkQueue>) {
        let html = match self.fetcher.fetch(url) {
            Some(html) => html,
            None => {
                tracing::debug!(%url, "nothing fetched, unit is a no-op");
                return;
            }
        };

        // links must come out before the remaining tags do
        let stripped = clean::strip_block_elements(&html);
        let links = clean::extract_links(url, &stripped);
        {
            let mut visited = self.visited.lock();
            for link in links {
                if visited.len() >= self.limit {
                    break;
                }
                if visited.insert(link.to_string()) {
                    Self::submit(self.clone(), link, queue.clone());
                }
            }
        }

        let text = clean::strip_entities(&clean::strip_tags(&stripped));
        let mut local = InvertedIndex::new();
        let location = url.as_str();
        for (position, stem) in stem_line(&text).iter().enumerate() {
            local.add(stem, location, position + 1);
        }
        if !local.is_empty() {
            self.index.merge_from(local);
        }
    }
}
