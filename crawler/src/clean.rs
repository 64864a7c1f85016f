use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

lazy_static! {
    /// Elements whose content must not be scanned for links or text.
    static ref BLOCKS: Vec<Regex> = ["head", "style", "script", "noscript", "svg"]
        .iter()
        .map(|element| {
            Regex::new(&format!(r"(?is)<{0}\b[^>]*>.*?</{0}\s*>", element)).expect("valid regex")
        })
        .collect();
    static ref TAGS: Regex = Regex::new(r"(?s)<[^>]*>").expect("valid regex");
    static ref ENTITIES: Regex = Regex::new(r"&[^\s;]+;").expect("valid regex");
    static ref ANCHORS: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Removes head, style, script, noscript, and svg blocks wholesale. Links
/// and text inside them never reach the rest of the pipeline.
pub fn strip_block_elements(html: &str) -> String {
    let mut out = html.to_string();
    for block in BLOCKS.iter() {
        out = block.replace_all(&out, " ").into_owned();
    }
    out
}

/// Replaces every remaining tag with a space so adjacent words stay split.
pub fn strip_tags(html: &str) -> String {
    TAGS.replace_all(html, " ").into_owned()
}

/// Replaces character entities with a space.
pub fn strip_entities(html: &str) -> String {
    ENTITIES.replace_all(html, " ").into_owned()
}

/// Absolute http(s) links found in `html`, resolved against `base`,
/// fragments dropped, first occurrence wins. Call on block-stripped HTML so
/// script and style content contribute nothing.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    for anchor in document.select(&ANCHORS) {
        let href = match anchor.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        let resolved = match Url::parse(href).or_else(|_| base.join(href)) {
            Ok(url) => url,
            Err(_) => continue,
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        let mut resolved = resolved;
        resolved.set_fragment(None);
        if !links.contains(&resolved) {
            links.push(resolved);
        }
    }
    links
}
