use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::{header, redirect};
use std::time::Duration;
use url::Url;

/// How many redirects a fetch may follow before giving up.
pub const MAX_REDIRECTS: usize = 3;

/// Source of page content. Crawl tasks see only this seam, so tests can
/// substitute canned pages for the network.
pub trait Fetch: Send + Sync {
    /// The HTML at `url`, or `None` when the resource is unreachable, does
    /// not resolve to a 200, or is not HTML.
    fn fetch(&self, url: &Url) -> Option<String>;
}

/// [`Fetch`] over HTTP(S) with a blocking client: limited redirects, a
/// request timeout, and a content-type gate.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Option<String> {
        let response = match self.client.get(url.clone()).send() {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(%url, %err, "request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "non-success response");
            return None;
        }
        let html = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.starts_with("text/html"));
        if !html {
            return None;
        }
        response.text().ok()
    }
}
