use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use stemdex::{ConcurrentIndex, WorkQueue};
use stemdex_crawler::{Fetch, WebCrawler};
use url::Url;

/// Serves canned pages from memory and records every fetch, so tests can
/// assert exactly which URLs were visited and how often.
struct StubFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn new(pages: Vec<(String, String)>) -> Arc<Self> {
        Arc::new(StubFetcher {
            pages: pages.into_iter().collect(),
            fetched: Mutex::new(Vec::new()),
        })
    }

    fn total_fetches(&self) -> usize {
        self.fetched.lock().len()
    }

    fn fetches_of(&self, url: &str) -> usize {
        self.fetched.lock().iter().filter(|u| *u == url).count()
    }
}

impl Fetch for StubFetcher {
    fn fetch(&self, url: &Url) -> Option<String> {
        self.fetched.lock().push(url.to_string());
        self.pages.get(url.as_str()).cloned()
    }
}

fn page(links: &[&str], text: &str) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{link}"></a> "#))
        .collect();
    format!("<html><head><title>t</title></head><body>{anchors}<p>{text}</p></body></html>")
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn stems(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn seed_page_is_fetched_and_indexed() {
    let fetcher = StubFetcher::new(vec![(
        "https://site.test/".to_string(),
        page(&[], "the cat sat"),
    )]);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(2));

    let crawler = WebCrawler::new(index.clone(), fetcher.clone(), 10);
    crawler.crawl(url("https://site.test/"), &queue);

    assert_eq!(crawler.visited_count(), 1);
    assert_eq!(fetcher.total_fetches(), 1);
    assert!(index.contains_location("cat", "https://site.test/"));
    assert_eq!(index.word_count("https://site.test/"), 3);
}

#[test]
fn links_are_followed_transitively() {
    let fetcher = StubFetcher::new(vec![
        ("https://site.test/a".to_string(), page(&["/b"], "alpha")),
        ("https://site.test/b".to_string(), page(&["/c"], "bravo")),
        ("https://site.test/c".to_string(), page(&[], "charlie")),
    ]);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(4));

    let crawler = WebCrawler::new(index.clone(), fetcher, 10);
    crawler.crawl(url("https://site.test/a"), &queue);

    assert_eq!(
        crawler.visited(),
        [
            "https://site.test/a",
            "https://site.test/b",
            "https://site.test/c",
        ]
    );
    assert!(index.contains_location("charli", "https://site.test/c"));
}

#[test]
fn limit_one_crawls_only_the_seed() {
    let fetcher = StubFetcher::new(vec![
        (
            "https://site.test/".to_string(),
            page(&["/a", "/b"], "words"),
        ),
        ("https://site.test/a".to_string(), page(&[], "more")),
    ]);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(4));

    let crawler = WebCrawler::new(index, fetcher.clone(), 1);
    crawler.crawl(url("https://site.test/"), &queue);

    assert_eq!(crawler.visited(), ["https://site.test/"]);
    assert_eq!(fetcher.total_fetches(), 1);
}

#[test]
fn cap_bounds_total_urls_for_any_fan_out() {
    // every page links to every other page, the worst case for the cap
    let names: Vec<String> = (0..50).map(|i| format!("https://site.test/p{i}")).collect();
    let links: Vec<String> = (0..50).map(|i| format!("/p{i}")).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let pages = names
        .iter()
        .map(|name| (name.clone(), page(&link_refs, "dense graph page")))
        .collect();

    let fetcher = StubFetcher::new(pages);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(8));

    let crawler = WebCrawler::new(index, fetcher.clone(), 10);
    crawler.crawl(url("https://site.test/p0"), &queue);

    assert_eq!(crawler.visited_count(), 10);
    assert_eq!(fetcher.total_fetches(), 10);
}

#[test]
fn racing_tasks_fetch_a_shared_link_once() {
    // diamond: a -> b, c; b -> d; c -> d
    let fetcher = StubFetcher::new(vec![
        (
            "https://site.test/a".to_string(),
            page(&["/b", "/c"], "top"),
        ),
        ("https://site.test/b".to_string(), page(&["/d"], "left")),
        ("https://site.test/c".to_string(), page(&["/d"], "right")),
        ("https://site.test/d".to_string(), page(&[], "bottom")),
    ]);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(4));

    let crawler = WebCrawler::new(index, fetcher.clone(), 10);
    crawler.crawl(url("https://site.test/a"), &queue);

    assert_eq!(crawler.visited_count(), 4);
    assert_eq!(fetcher.fetches_of("https://site.test/d"), 1);
    assert_eq!(fetcher.total_fetches(), 4);
}

#[test]
fn unreachable_urls_consume_the_cap_but_contribute_nothing() {
    let fetcher = StubFetcher::new(vec![(
        "https://site.test/".to_string(),
        page(&["/dead"], "live words"),
    )]);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(2));

    let crawler = WebCrawler::new(index.clone(), fetcher, 10);
    crawler.crawl(url("https://site.test/"), &queue);

    // the dead link was claimed and fetched, but its unit was a no-op
    assert_eq!(crawler.visited_count(), 2);
    assert_eq!(index.counts().len(), 1);
    assert!(!index.contains_location("live", "https://site.test/dead"));
}

#[test]
fn unreachable_seed_leaves_the_index_empty() {
    let fetcher = StubFetcher::new(Vec::new());
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(2));

    let crawler = WebCrawler::new(index.clone(), fetcher, 5);
    crawler.crawl(url("https://site.test/missing"), &queue);

    assert_eq!(crawler.visited_count(), 1);
    assert!(index.is_empty());
}

#[test]
fn crawled_pages_are_searchable() {
    let fetcher = StubFetcher::new(vec![
        (
            "https://site.test/a".to_string(),
            page(&["/b"], "the cat sat"),
        ),
        ("https://site.test/b".to_string(), page(&[], "the cat ran")),
    ]);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(4));

    let crawler = WebCrawler::new(index.clone(), fetcher, 10);
    crawler.crawl(url("https://site.test/a"), &queue);

    let results = index.exact_search(&stems(&["cat"]));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].location, "https://site.test/a");
    assert_eq!(results[1].location, "https://site.test/b");
    for result in &results {
        assert_eq!(result.count, 1);
        assert!((result.score - 1.0 / 3.0).abs() < 1e-12);
    }
}

#[test]
fn pool_is_reusable_after_a_crawl() {
    let fetcher = StubFetcher::new(vec![(
        "https://site.test/".to_string(),
        page(&[], "first crawl"),
    )]);
    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(2));

    let crawler = WebCrawler::new(index.clone(), fetcher, 5);
    crawler.crawl(url("https://site.test/"), &queue);

    let second = StubFetcher::new(vec![(
        "https://other.test/".to_string(),
        page(&[], "second crawl"),
    )]);
    let crawler = WebCrawler::new(index.clone(), second, 5);
    crawler.crawl(url("https://other.test/"), &queue);

    assert!(index.contains_location("first", "https://site.test/"));
    assert!(index.contains_location("second", "https://other.test/"));
}
