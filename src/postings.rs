use ahash::AHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Document identifier. Assignment starts at 1; id 0 is reserved for the
/// document-frequency slot inside final postings.
pub type DocId = u32;

/// The reserved posting key carrying a term's document frequency.
pub const DF_KEY: DocId = 0;

/// A posting parsed back from the final index: doc id (plus the reserved df
/// slot) to score.
pub type ParsedPosting = HashMap<DocId, f64>;

/// Rounds a score to five decimal places.
pub fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// A finalized posting ready for the index file: document frequency plus
/// tf-idf entries sorted by ascending doc id.
///
/// Serializes as a JSON object whose first key is `"0"` with the integer df,
/// followed by stringified doc-id keys in ascending numeric order.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalPosting {
    pub df: u64,
    pub entries: Vec<(DocId, f64)>,
}

impl FinalPosting {
    /// Finalizes an accumulated doc→tf map: df is the entry count before the
    /// reserved slot is injected, each tf becomes `round5(tf * idf)` with
    /// `idf = log10(total_docs / df)`, and entries sort by doc id.
    pub fn from_accumulated(accumulated: AHashMap<DocId, f64>, total_docs: u32) -> Self {
        let df = accumulated.len() as u64;
        let idf = (f64::from(total_docs) / df as f64).log10();

        let mut entries: Vec<(DocId, f64)> = accumulated
            .into_iter()
            .map(|(doc_id, tf)| (doc_id, round5(tf * idf)))
            .collect();
        entries.sort_unstable_by_key(|(doc_id, _)| *doc_id);

        Self { df, entries }
    }
}

impl Serialize for FinalPosting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry(&DF_KEY, &self.df)?;
        for (doc_id, score) in &self.entries {
            map.serialize_entry(doc_id, score)?;
        }
        map.end()
    }
}

/// Parses the JSON half of a `term|posting` index line. Doc-id keys come
/// back as integers; the df value at key 0 parses as a float alongside the
/// scores.
pub fn parse_posting(json: &str) -> Result<ParsedPosting, serde_json::Error> {
    serde_json::from_str(json)
}
