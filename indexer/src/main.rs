use anyhow::Result;
use clap::Parser;
use stemdex::queue::DEFAULT_THREADS;
use stemdex::{builder, ConcurrentIndex, QueryParser, WorkQueue};
use stemdex_crawler::{HttpFetcher, WebCrawler};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// User-Agent presented to crawled sites.
const USER_AGENT: &str = "stemdex-crawler/0.1";

/// Per-request timeout for crawl fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Parser)]
#[command(name = "stemdex")]
#[command(about = "Build a word-location index from text files or a crawl, then search it", long_about = None)]
struct Cli {
    /// Text file or directory of text files to index
    #[arg(long)]
    path: Option<PathBuf>,

    /// Seed URL to crawl into the index
    #[arg(long)]
    url: Option<Url>,

    /// Maximum number of URLs to crawl, seed included
    #[arg(long, default_value_t = 1)]
    max: usize,

    /// Number of worker threads
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Write the index as JSON, to index.json when no file is given
    #[arg(long, num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,

    /// Write per-location word counts as JSON, to counts.json when no file is given
    #[arg(long, num_args = 0..=1, default_missing_value = "counts.json")]
    counts: Option<PathBuf>,

    /// Text file of queries, one query per line
    #[arg(long)]
    queries: Option<PathBuf>,

    /// Match query stems exactly instead of by prefix
    #[arg(long, default_value_t = false)]
    exact: bool,

    /// Write search results as JSON, to results.json when no file is given
    #[arg(long, num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    let start = Instant::now();

    let queue = Arc::new(WorkQueue::new(args.threads));
    let index = Arc::new(ConcurrentIndex::new());

    if let Some(path) = &args.path {
        builder::build(path, &index, &queue)?;
    }

    if let Some(seed) = &args.url {
        let fetcher = HttpFetcher::new(USER_AGENT, FETCH_TIMEOUT)?;
        let crawler = WebCrawler::new(index.clone(), Arc::new(fetcher), args.max);
        crawler.crawl(seed.clone(), &queue);
        tracing::info!(visited = crawler.visited_count(), "crawl finished");
    }

    // Output failures do not stop the remaining sections.
    if let Some(path) = &args.index {
        if let Err(err) = index.write_json(path) {
            tracing::error!(path = %path.display(), %err, "unable to write index");
        }
    }

    if let Some(path) = &args.counts {
        if let Err(err) = index.write_counts_json(path) {
            tracing::error!(path = %path.display(), %err, "unable to write counts");
        }
    }

    let parser = QueryParser::new(index);
    if let Some(path) = &args.queries {
        parser.parse_query_file(path, args.exact, &queue)?;
    }

    if let Some(path) = &args.results {
        if let Err(err) = parser.write_json(path) {
            tracing::error!(path = %path.display(), %err, "unable to write results");
        }
    }

    println!("Elapsed: {:.6} seconds", start.elapsed().as_secs_f64());
    Ok(())
}
