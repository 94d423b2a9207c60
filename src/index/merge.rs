use ahash::AHashMap;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::fs;
use std::path::PathBuf;

use crate::config::{ArtifactLayout, IndexConfig};
use crate::errors::IndexError;
use crate::index::writer::IndexWriter;
use crate::postings::{DocId, FinalPosting};

/// Reads one partial shard in bounded term chunks. Loading a chunk
/// materializes the whole shard momentarily, slices the next window off its
/// sorted key list, and drops the full copy again, so the retained working
/// set stays at one chunk.
struct ShardReader {
    path: PathBuf,
    chunk_size: usize,
    cursor: usize,
    chunk: Vec<(String, HashMap<DocId, f64>)>,
    next_in_chunk: usize,
    exhausted: bool,
}

impl ShardReader {
    fn open(path: PathBuf, chunk_size: usize) -> Self {
        Self {
            path,
            chunk_size: chunk_size.max(1),
            cursor: 0,
            chunk: Vec::new(),
            next_in_chunk: 0,
            exhausted: false,
        }
    }

    /// The term at the shard's read head, loading the next chunk if the
    /// current one is spent.
    fn front_term(&mut self) -> Result<Option<&str>, IndexError> {
        self.ensure_chunk()?;
        Ok(self
            .chunk
            .get(self.next_in_chunk)
            .map(|(term, _)| term.as_str()))
    }

    /// Takes the entry at the read head and advances past it.
    fn pop_front(&mut self) -> Result<Option<(String, HashMap<DocId, f64>)>, IndexError> {
        self.ensure_chunk()?;
        if self.next_in_chunk >= self.chunk.len() {
            return Ok(None);
        }
        let entry = std::mem::take(&mut self.chunk[self.next_in_chunk]);
        self.next_in_chunk += 1;
        Ok(Some(entry))
    }

    fn ensure_chunk(&mut self) -> Result<(), IndexError> {
        if self.exhausted || self.next_in_chunk < self.chunk.len() {
            return Ok(());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| IndexError::ShardRead {
            path: self.path.clone(),
            source,
        })?;
        let full: BTreeMap<String, HashMap<DocId, f64>> =
            serde_json::from_str(&raw).map_err(|source| IndexError::ShardParse {
                path: self.path.clone(),
                source,
            })?;

        self.chunk = full
            .into_iter()
            .skip(self.cursor)
            .take(self.chunk_size)
            .collect();
        self.next_in_chunk = 0;
        if self.chunk.is_empty() {
            self.exhausted = true;
        } else {
            self.cursor += self.chunk.len();
        }
        Ok(())
    }
}

/// K-way merges the partial shards into the final index, term-offset file,
/// and character bucket map. Returns the number of unique terms written.
///
/// The heap is keyed by `(term, shard id)`, so equal terms pop in shard
/// order and the merge is deterministic. Shards partition the documents, so
/// postings for the same term never share a doc id and accumulate by plain
/// union.
pub fn merge_shards(
    config: &IndexConfig,
    layout: &ArtifactLayout,
    shard_count: usize,
    total_docs: u32,
) -> Result<u64, IndexError> {
    let mut shards: Vec<ShardReader> = (1..=shard_count)
        .map(|k| ShardReader::open(layout.partial_shard(k), config.chunk_size))
        .collect();

    let mut heap: BinaryHeap<Reverse<(String, usize)>> = BinaryHeap::new();
    for (shard_id, shard) in shards.iter_mut().enumerate() {
        if let Some(term) = shard.front_term()? {
            heap.push(Reverse((term.to_string(), shard_id)));
        }
    }

    let mut writer = IndexWriter::create(layout, config.sample_interval)?;
    let mut current_term: Option<String> = None;
    let mut accumulated: AHashMap<DocId, f64> = AHashMap::new();

    while let Some(Reverse((term, shard_id))) = heap.pop() {
        if current_term.as_deref() != Some(term.as_str()) {
            if let Some(finished) = current_term.take() {
                let posting =
                    FinalPosting::from_accumulated(std::mem::take(&mut accumulated), total_docs);
                writer.write_term(&finished, &posting)?;
            }
            current_term = Some(term.clone());
        }

        let (_, posting) = shards[shard_id]
            .pop_front()?
            .unwrap_or_else(|| (term.clone(), HashMap::new()));
        accumulated.extend(posting);

        if let Some(next) = shards[shard_id].front_term()? {
            heap.push(Reverse((next.to_string(), shard_id)));
        }
    }

    if let Some(finished) = current_term {
        let posting = FinalPosting::from_accumulated(accumulated, total_docs);
        writer.write_term(&finished, &posting)?;
    }

    writer.finish(layout)
}
