use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Stem a line into normalized word tokens, in order of appearance.
///
/// Every token produced here occupies one position in the index, so no
/// stopword filtering happens at this layer.
pub fn stem_line(line: &str) -> Vec<String> {
    let normalized = line.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|mat| STEMMER.stem(mat.as_str()).to_string())
        .collect()
}

/// Stem a line into a sorted set of unique tokens, used to normalize queries.
pub fn unique_stems(line: &str) -> BTreeSet<String> {
    let normalized = line.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|mat| STEMMER.stem(mat.as_str()).to_string())
        .collect()
}
