pub mod clean;
pub mod crawl;
pub mod fetch;

pub use crawl::WebCrawler;
pub use fetch::{Fetch, HttpFetcher, MAX_REDIRECTS};
