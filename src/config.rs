use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of distinct terms held in memory before the partial index
/// is spilled to a shard file.
pub const DEFAULT_TERM_THRESHOLD: usize = 300_000;

/// Number of terms a shard reader materializes per chunk during the merge.
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Every Nth term written to the final index gets an offset sample.
pub const DEFAULT_SAMPLE_INTERVAL: u64 = 1_000;

/// Extra count added per occurrence of a term inside an important tag.
/// One baseline occurrence plus this boost gives important text triple weight.
pub const DEFAULT_IMPORTANT_BOOST: u32 = 2;

/// Tags whose text gets boosted counts.
pub const IMPORTANT_TAG_SELECTOR: &str = "h1, h2, h3, b, strong, title";

/// Tunable knobs for the build pipeline.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Spill the in-memory partial index once it holds this many terms.
    pub term_threshold: usize,
    /// Terms per shard chunk during the k-way merge.
    pub chunk_size: usize,
    /// Offset sampling interval in the final index.
    pub sample_interval: u64,
    /// Count added per important-tag occurrence of a term.
    pub important_boost: u32,
    /// CSS selector for the important tag set.
    pub important_tags: String,
    /// Keep the intermediate partial shards after a successful merge.
    pub keep_partials: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            term_threshold: DEFAULT_TERM_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            important_boost: DEFAULT_IMPORTANT_BOOST,
            important_tags: IMPORTANT_TAG_SELECTOR.to_string(),
            keep_partials: false,
        }
    }
}

/// On-disk layout of every artifact the pipelines produce, rooted at a
/// working directory. Text artifacts live under `txt/`, JSON under `json/`.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn txt_dir(&self) -> PathBuf {
        self.root.join("txt")
    }

    pub fn json_dir(&self) -> PathBuf {
        self.root.join("json")
    }

    /// The final index: one `term|posting-json` line per term.
    pub fn complete_index(&self) -> PathBuf {
        self.txt_dir().join("complete_index.txt")
    }

    /// Sparse `term:byte_offset` samples into the final index.
    pub fn term_offsets(&self) -> PathBuf {
        self.txt_dir().join("term_offsets.txt")
    }

    /// First-character byte ranges over the term offset file.
    pub fn char_offsets(&self) -> PathBuf {
        self.json_dir().join("char_offsets.json")
    }

    /// One URL per line; line N holds the URL of doc id N.
    pub fn document_mapping(&self) -> PathBuf {
        self.txt_dir().join("document_mapping.txt")
    }

    /// Append-only diagnostic log written during the build.
    pub fn build_log(&self) -> PathBuf {
        self.txt_dir().join("log.txt")
    }

    /// The k-th partial shard (k starts at 1).
    pub fn partial_shard(&self, k: usize) -> PathBuf {
        self.json_dir().join(format!("partial_index{k}.json"))
    }

    /// Create the artifact directories and reset files from a previous run:
    /// the final index, offset file, and log are truncated, and stale
    /// partial shards are removed.
    pub fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(self.txt_dir())?;
        fs::create_dir_all(self.json_dir())?;

        File::create(self.complete_index())?;
        File::create(self.term_offsets())?;
        File::create(self.build_log())?;

        self.remove_partials()?;
        Ok(())
    }

    /// Delete every `partial_index{k}.json` under the JSON directory.
    pub fn remove_partials(&self) -> io::Result<()> {
        for entry in fs::read_dir(self.json_dir())? {
            let entry = entry?;
            if is_partial_shard(&entry.path()) {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

fn is_partial_shard(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with("partial_index") && name.ends_with(".json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_paths_are_rooted() {
        let layout = ArtifactLayout::new("/work");
        assert_eq!(
            layout.complete_index(),
            PathBuf::from("/work/txt/complete_index.txt")
        );
        assert_eq!(
            layout.char_offsets(),
            PathBuf::from("/work/json/char_offsets.json")
        );
        assert_eq!(
            layout.partial_shard(3),
            PathBuf::from("/work/json/partial_index3.json")
        );
    }

    #[test]
    fn prepare_truncates_and_removes_stale_shards() {
        let dir = TempDir::new().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        layout.prepare().unwrap();

        fs::write(layout.complete_index(), "old|{}\n").unwrap();
        fs::write(layout.partial_shard(1), "{}").unwrap();
        fs::write(layout.partial_shard(7), "{}").unwrap();

        layout.prepare().unwrap();
        assert_eq!(fs::read_to_string(layout.complete_index()).unwrap(), "");
        assert!(!layout.partial_shard(1).exists());
        assert!(!layout.partial_shard(7).exists());
    }
}
