use anyhow::Result;
use clap::Parser as ClapParser;
use tracing::Level;

mod cli;

use cli::{Args, Command};
use devsearch::config::{ArtifactLayout, IndexConfig};
use devsearch::index::build_index;
use devsearch::search::SearchEngine;

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match args.command {
        Command::Index {
            corpus,
            output,
            term_threshold,
            chunk_size,
            sample_interval,
            boost,
            keep_partials,
        } => {
            let config = IndexConfig {
                term_threshold,
                chunk_size,
                sample_interval,
                important_boost: boost,
                keep_partials,
                ..IndexConfig::default()
            };
            let layout = ArtifactLayout::new(output);
            let stats = build_index(&config, &corpus, &layout)?;
            println!(
                "Indexed {} documents ({} shards, {} unique terms)",
                stats.documents, stats.shards, stats.unique_terms
            );
        }

        Command::Search {
            terms,
            output,
            limit,
        } => {
            let layout = ArtifactLayout::new(output);
            let engine = SearchEngine::open(&layout)?;
            let urls = engine.search(&terms);

            if urls.is_empty() {
                println!("No matched results");
            } else {
                for (rank, url) in urls.iter().take(limit).enumerate() {
                    println!("{} | {}", rank + 1, url);
                }
                if urls.len() > limit {
                    println!("... {} more results", urls.len() - limit);
                }
            }
        }
    }

    Ok(())
}
