//! # Devsearch
//!
//! Devsearch is a disk-backed tf-idf search engine over a crawled corpus of
//! HTML pages stored as JSON envelopes.
//!
//! The build pipeline tokenizes and stems each page, weighs text inside
//! important tags, spills sorted partial shards to disk, and k-way merges
//! them into a single sorted index file plus two small lookup structures: a
//! sampled term-offset file and a per-character byte-range map. The query
//! pipeline uses those structures to seek straight to a term's posting
//! without ever loading the index into memory, then ranks the union of
//! matching documents by summed tf-idf.
//!
//! ## Examples
//!
//! ### Building an index
//!
//! ```no_run
//! use devsearch::config::{ArtifactLayout, IndexConfig};
//! use devsearch::index::build_index;
//! use std::path::Path;
//!
//! let config = IndexConfig::default();
//! let layout = ArtifactLayout::new(".");
//! let stats = build_index(&config, Path::new("developer/DEV"), &layout).unwrap();
//! println!("{} documents, {} terms", stats.documents, stats.unique_terms);
//! ```
//!
//! ### Querying
//!
//! ```no_run
//! use devsearch::config::ArtifactLayout;
//! use devsearch::search::SearchEngine;
//!
//! let engine = SearchEngine::open(&ArtifactLayout::new(".")).unwrap();
//! let urls = engine.search(&["antarctica warming".to_string()]);
//! for url in urls.iter().take(10) {
//!     println!("{url}");
//! }
//! ```

pub mod config;
pub mod errors;
pub mod html;
pub mod index;
pub mod postings;
pub mod ranking;
pub mod search;
pub mod tokenize;
