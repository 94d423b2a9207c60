use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

use crate::config::ArtifactLayout;
use crate::errors::IndexError;
use crate::postings::FinalPosting;

/// Streams finalized terms into the final index while maintaining the two
/// auxiliary lookup structures:
///
/// - the term-offset file, holding `term:byte_offset` samples (every Nth
///   term, plus the first and last term of every first-character bucket),
/// - the character bucket map, giving each first character the byte range
///   of its samples inside the term-offset file.
///
/// Byte positions are running counters over written lines, so every sample
/// points at the start of its `term|posting` line.
pub struct IndexWriter {
    index_out: BufWriter<File>,
    index_pos: u64,
    offsets_out: BufWriter<File>,
    offsets_pos: u64,
    sample_interval: u64,
    unique_terms: u64,
    current_char: Option<char>,
    samples: Vec<(String, u64)>,
    prev_term: Option<(String, u64)>,
    char_ranges: BTreeMap<char, [u64; 2]>,
}

impl IndexWriter {
    pub fn create(layout: &ArtifactLayout, sample_interval: u64) -> Result<Self, IndexError> {
        let index_out = BufWriter::new(File::create(layout.complete_index())?);
        let offsets_out = BufWriter::new(
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(layout.term_offsets())?,
        );
        Ok(Self {
            index_out,
            index_pos: 0,
            offsets_out,
            offsets_pos: 0,
            sample_interval: sample_interval.max(1),
            unique_terms: 0,
            current_char: None,
            samples: Vec::new(),
            prev_term: None,
            char_ranges: BTreeMap::new(),
        })
    }

    /// Appends one finalized term. Terms must arrive in ascending byte
    /// order; each call writes a `term|posting-json` line.
    pub fn write_term(&mut self, term: &str, posting: &FinalPosting) -> Result<(), IndexError> {
        let Some(first_char) = term.chars().next() else {
            return Ok(());
        };
        self.unique_terms += 1;

        match self.current_char {
            None => {
                self.current_char = Some(first_char);
                self.samples.push((term.to_string(), self.index_pos));
            }
            Some(current) if current != first_char => {
                self.close_bucket(current)?;
                self.current_char = Some(first_char);
                self.samples.push((term.to_string(), self.index_pos));
            }
            Some(_) => {
                if self.unique_terms % self.sample_interval == 0 {
                    self.samples.push((term.to_string(), self.index_pos));
                }
            }
        }

        let json = serde_json::to_string(posting)?;
        let line_len = term.len() as u64 + 1 + json.len() as u64 + 1;
        self.index_out.write_all(term.as_bytes())?;
        self.index_out.write_all(b"|")?;
        self.index_out.write_all(json.as_bytes())?;
        self.index_out.write_all(b"\n")?;

        self.prev_term = Some((term.to_string(), self.index_pos));
        self.index_pos += line_len;
        Ok(())
    }

    /// Flushes the pending samples of the bucket for `bucket_char` and
    /// records its byte range. The bucket's last term is always sampled.
    fn close_bucket(&mut self, bucket_char: char) -> Result<(), IndexError> {
        if let Some((term, pos)) = self.prev_term.clone() {
            let already_sampled = self
                .samples
                .last()
                .is_some_and(|(sampled, _)| *sampled == term);
            if !already_sampled {
                self.samples.push((term, pos));
            }
        }

        let start = self.offsets_pos;
        for (term, pos) in std::mem::take(&mut self.samples) {
            let line = format!("{term}:{pos}\n");
            self.offsets_out.write_all(line.as_bytes())?;
            self.offsets_pos += line.len() as u64;
        }
        self.char_ranges.insert(bucket_char, [start, self.offsets_pos]);
        Ok(())
    }

    /// Closes the trailing bucket, flushes both files, and writes the
    /// character bucket map. Returns the number of terms written.
    pub fn finish(mut self, layout: &ArtifactLayout) -> Result<u64, IndexError> {
        if let Some(current) = self.current_char {
            self.close_bucket(current)?;
        }
        self.index_out.flush()?;
        self.offsets_out.flush()?;

        let char_file = File::create(layout.char_offsets())?;
        let mut writer = BufWriter::new(char_file);
        serde_json::to_writer(&mut writer, &self.char_ranges)?;
        writer.flush()?;

        Ok(self.unique_terms)
    }
}
