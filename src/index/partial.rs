use ahash::AHashMap;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::IndexError;
use crate::postings::{round5, DocId};

/// Normalized term frequency: `(1 + log10(f)) / log10(U)` where `U` is the
/// document's distinct-term count, rounded to five decimal places. A
/// document with a single distinct term would divide by zero; its tf keeps
/// the numerator alone.
pub fn normalized_tf(count: u32, distinct_terms: usize) -> f64 {
    let numerator = 1.0 + f64::from(count).log10();
    let denominator = (distinct_terms as f64).log10();
    if denominator == 0.0 {
        round5(numerator)
    } else {
        round5(numerator / denominator)
    }
}

/// The in-memory partial index: term to (doc id to normalized tf). Grows
/// document by document and spills to a sorted shard file once it crosses
/// the term threshold.
#[derive(Debug, Default)]
pub struct PartialIndex {
    terms: AHashMap<String, AHashMap<DocId, f64>>,
}

impl PartialIndex {
    /// Folds one weighted document into the index.
    pub fn add_document(&mut self, doc_id: DocId, counts: &AHashMap<String, u32>) {
        let distinct_terms = counts.len();
        for (term, &count) in counts {
            let tf = normalized_tf(count, distinct_terms);
            self.terms
                .entry(term.clone())
                .or_default()
                .insert(doc_id, tf);
        }
    }

    /// Number of distinct terms currently held.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Writes the whole mapping as a single JSON object with terms in
    /// lexicographic order (and doc ids ascending within each posting),
    /// then clears the in-memory state.
    pub fn spill(&mut self, path: &Path) -> Result<(), IndexError> {
        let sorted: BTreeMap<&str, BTreeMap<DocId, f64>> = self
            .terms
            .iter()
            .map(|(term, posting)| {
                (
                    term.as_str(),
                    posting.iter().map(|(&doc, &tf)| (doc, tf)).collect(),
                )
            })
            .collect();

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &sorted)?;
        writer.flush()?;

        self.terms.clear();
        Ok(())
    }
}

/// Writes the doc-id→URL mapping: line N (1-indexed) holds the URL of doc N.
pub fn write_document_mapping(path: &Path, urls: &[String]) -> Result<(), IndexError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for url in urls {
        writeln!(writer, "{url}")?;
    }
    writer.flush()?;
    Ok(())
}
