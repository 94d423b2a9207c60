// Build pipeline: corpus intake, partial-index spilling, k-way merge.
mod document;
mod log;
mod merge;
mod partial;
mod writer;

pub use document::{read_page, walk_corpus, CrawlPage, DuplicateFilter};
pub use partial::{normalized_tf, PartialIndex};

use anyhow::{Context, Result};
use scraper::Html;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{ArtifactLayout, IndexConfig};
use crate::html::{extract_important_text, extract_text, parse_tag_selector};
use crate::index::log::BuildLog;
use crate::index::partial::write_document_mapping;
use crate::tokenize::{apply_important_boost, term_counts};

/// Totals reported after a successful build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Documents that survived filtering and received a doc id.
    pub documents: u32,
    /// Partial shards spilled before the merge.
    pub shards: usize,
    /// Unique terms in the final index.
    pub unique_terms: u64,
}

/// Runs the whole build pipeline: walk the corpus, filter and weigh each
/// page, spill partial shards, merge them into the final index, and write
/// the auxiliary lookup files.
///
/// Per-page problems (unreadable file, malformed envelope, empty or
/// duplicate content, zero tokens) skip the page without consuming a doc
/// id. Structural problems (unwritable artifacts, unreadable shards) abort.
pub fn build_index(
    config: &IndexConfig,
    corpus: &Path,
    layout: &ArtifactLayout,
) -> Result<IndexStats> {
    let selector = parse_tag_selector(&config.important_tags)?;
    layout
        .prepare()
        .context("could not prepare artifact directories")?;
    let mut log = BuildLog::open(&layout.build_log())?;

    let mut partial = PartialIndex::default();
    let mut filter = DuplicateFilter::default();
    let mut doc_urls: Vec<String> = Vec::new();
    let mut shard_count = 0usize;

    info!(corpus = %corpus.display(), "building index");
    for path in walk_corpus(corpus) {
        let page = match read_page(&path) {
            Ok(page) => page,
            Err(err) if err.is_page_local() => {
                debug!(path = %path.display(), %err, "skipping unreadable page");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let document = Html::parse_document(&page.content);
        let text = extract_text(&document);
        if text.is_empty() {
            debug!(path = %path.display(), "skipping page with no text");
            continue;
        }
        if filter.is_duplicate(&text) {
            debug!(path = %path.display(), "skipping duplicate page");
            continue;
        }

        let mut counts = term_counts(&text);
        if counts.is_empty() {
            debug!(path = %path.display(), "skipping page with no tokens");
            continue;
        }
        let important = extract_important_text(&document, &selector);
        apply_important_boost(&mut counts, &important, config.important_boost);

        let doc_id = doc_urls.len() as u32 + 1;
        doc_urls.push(page.url);
        partial.add_document(doc_id, &counts);

        if partial.len() >= config.term_threshold {
            shard_count += 1;
            partial.spill(&layout.partial_shard(shard_count))?;
            log.write_line(&format!("{} docs indexed", doc_urls.len()))?;
            log.write_line("Finished a write")?;
            debug!(shard = shard_count, "spilled partial shard");
        }
    }

    if !partial.is_empty() {
        shard_count += 1;
        partial.spill(&layout.partial_shard(shard_count))?;
        log.write_line(&format!("{} docs indexed", doc_urls.len()))?;
        log.write_line("Finished a write")?;
    }

    write_document_mapping(&layout.document_mapping(), &doc_urls)?;

    let documents = doc_urls.len() as u32;
    info!(documents, shards = shard_count, "merging partial shards");
    log.write_line("Writing complete index to file")?;
    let unique_terms = merge::merge_shards(config, layout, shard_count, documents)?;

    let index_kb = std::fs::metadata(layout.complete_index())
        .map(|meta| meta.len() / 1024)
        .unwrap_or(0);
    log.write_line(&format!("Total number of documents indexed: {documents}"))?;
    log.write_line(&format!("Total number of unique terms: {unique_terms}"))?;
    log.write_line(&format!("Size of full index: {index_kb} KB"))?;

    if !config.keep_partials {
        layout.remove_partials()?;
    }

    info!(documents, unique_terms, "index build complete");
    Ok(IndexStats {
        documents,
        shards: shard_count,
        unique_terms,
    })
}
