use ahash::{AHashMap, AHashSet};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::sync::OnceLock;

/// Returns a reference to the global stemmer instance
pub fn get_stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Token pattern: maximal runs of ASCII alphanumerics.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-zA-Z0-9]+").expect("token pattern is valid"))
}

/// Tokenizes text into lowercase alphanumeric runs and Porter-stems each one.
/// Multiplicity is preserved; order follows the input.
pub fn tokenize_and_stem(text: &str) -> Vec<String> {
    token_pattern()
        .find_iter(text)
        .map(|token| {
            let lowercase = token.as_str().to_lowercase();
            get_stemmer().stem(&lowercase).into_owned()
        })
        .collect()
}

/// Maps each stemmed term of `text` to its occurrence count.
pub fn term_counts(text: &str) -> AHashMap<String, u32> {
    let mut counts = AHashMap::new();
    for term in tokenize_and_stem(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Adds `boost` to the count of every stemmed token in the important
/// fragments, with multiplicity. A token appearing only inside an important
/// tag still enters the map here, since the fragment text is part of the
/// document body as well.
pub fn apply_important_boost(
    counts: &mut AHashMap<String, u32>,
    fragments: &[String],
    boost: u32,
) {
    for fragment in fragments {
        for term in tokenize_and_stem(fragment) {
            *counts.entry(term).or_insert(0) += boost;
        }
    }
}

/// Tokenizes and stems raw query strings into distinct terms, preserving
/// first-appearance order across the whole query sequence.
pub fn distinct_query_terms(raw_terms: &[String]) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut terms = Vec::new();
    for raw in raw_terms {
        for term in tokenize_and_stem(raw) {
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
    }
    terms
}
