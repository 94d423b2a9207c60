// Query pipeline: char-bucket lookup, posting retrieval, ranking.
mod lookup;

pub use lookup::PostingLookup;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use tracing::{debug, warn};

use crate::config::ArtifactLayout;
use crate::postings::ParsedPosting;
use crate::ranking::rank_documents;
use crate::tokenize::distinct_query_terms;

/// Read-only handle over the build artifacts, serving ranked URL lists for
/// raw query terms. The character bucket map and URL map are small and held
/// in memory; postings are fetched by seeking the final index per request.
pub struct SearchEngine {
    lookup: PostingLookup,
    char_ranges: HashMap<char, (u64, u64)>,
    doc_urls: Vec<String>,
}

impl SearchEngine {
    /// Opens the artifacts under `layout`. Fails when the bucket map or the
    /// document URL map is missing, since no query can be answered without
    /// them.
    pub fn open(layout: &ArtifactLayout) -> Result<Self> {
        let char_path = layout.char_offsets();
        let raw = fs::read_to_string(&char_path)
            .with_context(|| format!("could not read {}", char_path.display()))?;
        let char_ranges: HashMap<char, (u64, u64)> = serde_json::from_str(&raw)
            .with_context(|| format!("malformed bucket map {}", char_path.display()))?;

        let map_path = layout.document_mapping();
        let doc_urls: Vec<String> = fs::read_to_string(&map_path)
            .with_context(|| format!("could not read {}", map_path.display()))?
            .lines()
            .map(str::to_string)
            .collect();

        Ok(Self {
            lookup: PostingLookup::new(layout.complete_index(), layout.term_offsets()),
            char_ranges,
            doc_urls,
        })
    }

    /// Runs the full query pipeline: tokenize and stem the raw terms,
    /// fetch each distinct term's posting, rank the union, and map the
    /// ranked doc ids to URLs. Unknown terms and per-term read errors
    /// contribute nothing.
    pub fn search(&self, raw_terms: &[String]) -> Vec<String> {
        let terms = distinct_query_terms(raw_terms);
        if terms.is_empty() {
            return Vec::new();
        }

        let postings = self.fetch_postings(&terms);
        rank_documents(&postings)
            .into_iter()
            .filter_map(|doc_id| self.doc_urls.get(doc_id as usize - 1))
            .cloned()
            .collect()
    }

    /// Retrieves the posting for one already-stemmed term, or `None` when
    /// the term (or its character bucket) is absent.
    pub fn posting(&self, term: &str) -> Option<ParsedPosting> {
        let first_char = term.chars().next()?;
        let &bucket = self.char_ranges.get(&first_char)?;
        match self.lookup.posting_in_bucket(term, bucket) {
            Ok(posting) => posting,
            Err(err) => {
                warn!(term, %err, "posting lookup failed");
                None
            }
        }
    }

    fn fetch_postings(&self, terms: &[String]) -> Vec<ParsedPosting> {
        let mut postings = Vec::new();
        for term in terms {
            match self.posting(term) {
                Some(posting) => postings.push(posting),
                None => debug!(term, "no posting for query term"),
            }
        }
        postings
    }

    /// Number of indexed documents.
    pub fn document_count(&self) -> usize {
        self.doc_urls.len()
    }
}
