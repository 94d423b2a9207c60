use ahash::AHashSet;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::IndexError;

/// The JSON envelope a crawled page is stored in.
#[derive(Debug, Deserialize)]
pub struct CrawlPage {
    pub url: String,
    pub content: String,
}

/// Walks the two-level corpus tree (domain directories containing page
/// files) in a deterministic, name-sorted order. Doc ids follow this order.
pub fn walk_corpus(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Reads one page envelope. Encoding, I/O, and JSON shape problems all
/// surface as page-local errors so the caller can skip the file.
pub fn read_page(path: &Path) -> Result<CrawlPage, IndexError> {
    let file = File::open(path).map_err(|source| IndexError::PageRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| IndexError::PageParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Content-hash filter for exact-duplicate pages.
#[derive(Debug, Default)]
pub struct DuplicateFilter {
    seen: AHashSet<String>,
}

impl DuplicateFilter {
    /// Returns true when the extracted text has been seen before. First
    /// sightings are recorded, so a later skip of the same page (for
    /// example, when it has no tokens) still marks the content as seen.
    pub fn is_duplicate(&mut self, text: &str) -> bool {
        let digest = md5::compute(text.as_bytes());
        !self.seen.insert(format!("{digest:x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_yields_leaf_files_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("b.org")).unwrap();
        fs::create_dir(dir.path().join("a.org")).unwrap();
        fs::write(dir.path().join("b.org/2.json"), "{}").unwrap();
        fs::write(dir.path().join("a.org/9.json"), "{}").unwrap();
        fs::write(dir.path().join("a.org/1.json"), "{}").unwrap();
        // Files directly under the root are not corpus leaves.
        fs::write(dir.path().join("stray.json"), "{}").unwrap();

        let names: Vec<String> = walk_corpus(dir.path())
            .iter()
            .map(|path| {
                let parent = path.parent().unwrap().file_name().unwrap();
                format!("{}/{}", parent.to_str().unwrap(), path.file_name().unwrap().to_str().unwrap())
            })
            .collect();
        assert_eq!(names, vec!["a.org/1.json", "a.org/9.json", "b.org/2.json"]);
    }

    #[test]
    fn read_page_rejects_malformed_envelopes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.json");
        fs::write(&path, "not json").unwrap();
        let err = read_page(&path).unwrap_err();
        assert!(err.is_page_local());

        fs::write(&path, r#"{"url": "http://a", "content": "<p>hi</p>"}"#).unwrap();
        let page = read_page(&path).unwrap();
        assert_eq!(page.url, "http://a");
    }

    #[test]
    fn duplicate_filter_flags_repeated_content() {
        let mut filter = DuplicateFilter::default();
        assert!(!filter.is_duplicate("same words"));
        assert!(filter.is_duplicate("same words"));
        assert!(!filter.is_duplicate("different words"));
    }
}
