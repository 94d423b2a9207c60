use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;

use devsearch::config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_IMPORTANT_BOOST, DEFAULT_SAMPLE_INTERVAL, DEFAULT_TERM_THRESHOLD,
};

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Disk-backed tf-idf search engine over crawled web corpora", long_about = None)]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the full index from a crawled corpus
    Index {
        /// Corpus root: two levels of directories, domain then page files
        #[arg(long, default_value = "developer/DEV")]
        corpus: PathBuf,

        /// Directory the txt/ and json/ artifacts are written under
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Spill the in-memory index once it holds this many terms
        #[arg(long = "term-threshold", default_value_t = DEFAULT_TERM_THRESHOLD)]
        term_threshold: usize,

        /// Terms loaded per shard chunk during the merge
        #[arg(long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Record a term offset sample every N terms
        #[arg(long = "sample-interval", default_value_t = DEFAULT_SAMPLE_INTERVAL)]
        sample_interval: u64,

        /// Extra count per occurrence of a term inside an important tag
        #[arg(long, default_value_t = DEFAULT_IMPORTANT_BOOST)]
        boost: u32,

        /// Keep the intermediate partial shards after the merge
        #[arg(long = "keep-partials")]
        keep_partials: bool,
    },

    /// Query the index and print ranked result URLs
    Search {
        /// Raw query terms
        #[arg(value_name = "TERM", required = true)]
        terms: Vec<String>,

        /// Directory the index artifacts live under
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Number of results to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}
