use ahash::AHashSet;

use crate::postings::{round5, DocId, ParsedPosting, DF_KEY};

/// Ranks the union of doc ids across the matched postings by summed tf-idf.
///
/// The reserved df slot at key 0 never enters the candidate set. Each
/// candidate's score is the sum of its entries across all postings, rounded
/// to five decimal places; ties order by ascending doc id so the ranking is
/// deterministic.
pub fn rank_documents(postings: &[ParsedPosting]) -> Vec<DocId> {
    let mut candidates: AHashSet<DocId> = AHashSet::new();
    for posting in postings {
        candidates.extend(posting.keys().copied().filter(|&doc| doc != DF_KEY));
    }

    let mut scored: Vec<(DocId, f64)> = candidates
        .into_iter()
        .map(|doc| {
            let score: f64 = postings
                .iter()
                .filter_map(|posting| posting.get(&doc))
                .sum();
            (doc, round5(score))
        })
        .collect();

    scored.sort_by(|(doc_a, score_a), (doc_b, score_b)| {
        score_b.total_cmp(score_a).then(doc_a.cmp(doc_b))
    });

    scored.into_iter().map(|(doc, _)| doc).collect()
}
