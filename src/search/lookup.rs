use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::postings::{parse_posting, ParsedPosting};

/// Seek-based posting retrieval over the final index.
///
/// A term is located in two hops: its first character selects a byte range
/// of the term-offset file, a linear scan of that range brackets the term's
/// position in the final index, and a bounded read of the bracketed bytes
/// finds the posting line. The index itself is never loaded into memory.
pub struct PostingLookup {
    index_path: PathBuf,
    offsets_path: PathBuf,
}

impl PostingLookup {
    pub fn new(index_path: PathBuf, offsets_path: PathBuf) -> Self {
        Self {
            index_path,
            offsets_path,
        }
    }

    /// Fetches the posting for one stemmed term, given its first-character
    /// bucket `[lo, hi)` in the term-offset file. Returns `None` when the
    /// term is absent.
    pub fn posting_in_bucket(
        &self,
        term: &str,
        bucket: (u64, u64),
    ) -> std::io::Result<Option<ParsedPosting>> {
        let (lower, upper) = self.bracket_term(term, bucket)?;
        self.scan_index(term, lower, upper)
    }

    /// Scans the bucket's samples, maintaining the byte bounds of the index
    /// region that can hold the term: samples below the term raise the
    /// lower bound, the first sample above it sets the upper bound, and an
    /// exact hit pins both to one line.
    fn bracket_term(&self, term: &str, (lo, hi): (u64, u64)) -> std::io::Result<(u64, u64)> {
        let mut reader = seek_reader(&self.offsets_path, lo)?;
        let mut pos = lo;
        let mut lower = 0u64;
        let mut upper = 0u64;

        let mut line = String::new();
        while pos < hi {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            pos += read as u64;

            let Some((word, offset)) = line.trim_end().split_once(':') else {
                continue;
            };
            let Ok(offset) = offset.parse::<u64>() else {
                continue;
            };

            if word < term {
                lower = offset;
            } else if word > term {
                upper = offset;
                break;
            } else {
                lower = offset;
                upper = offset;
                break;
            }
        }
        Ok((lower, upper))
    }

    /// Reads index lines from `lower` while the line start stays within
    /// `upper`, returning the posting of the line whose term matches.
    fn scan_index(
        &self,
        term: &str,
        lower: u64,
        upper: u64,
    ) -> std::io::Result<Option<ParsedPosting>> {
        let mut reader = seek_reader(&self.index_path, lower)?;
        let mut pos = lower;

        let mut line = String::new();
        while pos <= upper {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            pos += read as u64;

            let Some((word, json)) = line.trim_end().split_once('|') else {
                continue;
            };
            if word == term {
                match parse_posting(json) {
                    Ok(posting) => return Ok(Some(posting)),
                    Err(err) => {
                        tracing::warn!(term, %err, "unparseable posting line");
                        return Ok(None);
                    }
                }
            }
        }
        Ok(None)
    }
}

fn seek_reader(path: &Path, pos: u64) -> std::io::Result<BufReader<File>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(pos))?;
    Ok(BufReader::new(file))
}
