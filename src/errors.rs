use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the build and query pipelines.
///
/// Per-page intake errors (`PageRead`, `PageParse`) are recoverable: the
/// offending page is skipped and never consumes a doc id. Shard errors are
/// structural and abort the merge.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("could not read page file {path}: {source}")]
    PageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed page envelope {path}: {source}")]
    PageParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not read partial shard {path}: {source}")]
    ShardRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed partial shard {path}: {source}")]
    ShardParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid important-tag selector: {selector:?}")]
    Selector { selector: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl IndexError {
    /// Whether this error only affects a single page and the build can
    /// continue without it.
    pub fn is_page_local(&self) -> bool {
        matches!(self, Self::PageRead { .. } | Self::PageParse { .. })
    }
}
