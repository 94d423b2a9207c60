use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use tempfile::TempDir;

use devsearch::config::{ArtifactLayout, IndexConfig};
use devsearch::index::{build_index, IndexStats};
use devsearch::postings::{parse_posting, round5, DocId, ParsedPosting};
use devsearch::search::SearchEngine;

// Helper to drop a page envelope into the two-level corpus tree.
fn write_page(corpus: &Path, domain: &str, name: &str, url: &str, content: &str) {
    let dir = corpus.join(domain);
    fs::create_dir_all(&dir).unwrap();
    let envelope = serde_json::json!({ "url": url, "content": content });
    fs::write(dir.join(name), envelope.to_string()).unwrap();
}

fn build(corpus: &Path, output: &Path, config: &IndexConfig) -> IndexStats {
    build_index(config, corpus, &ArtifactLayout::new(output)).unwrap()
}

fn read_index(layout: &ArtifactLayout) -> Vec<(String, ParsedPosting)> {
    fs::read_to_string(layout.complete_index())
        .unwrap()
        .lines()
        .map(|line| {
            let (term, json) = line.split_once('|').unwrap();
            (term.to_string(), parse_posting(json).unwrap())
        })
        .collect()
}

#[test]
fn single_document_single_term() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://a", "<p>hello hello hello</p>");

    let layout = ArtifactLayout::new(dir.path());
    let stats = build(&corpus, dir.path(), &IndexConfig::default());
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.unique_terms, 1);

    assert_eq!(
        fs::read_to_string(layout.document_mapping()).unwrap(),
        "http://a\n"
    );

    // One term, df 1, idf log10(1/1) = 0, so the tf-idf entry is zero.
    let index = fs::read_to_string(layout.complete_index()).unwrap();
    assert_eq!(index, "hello|{\"0\":1,\"1\":0.0}\n");

    let engine = SearchEngine::open(&layout).unwrap();
    assert_eq!(engine.search(&["hello".to_string()]), vec!["http://a"]);
}

#[test]
fn important_tag_boost_triples_weight() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://boosted", "<h1>cat</h1> dog dog");
    write_page(&corpus, "a.com", "2.json", "http://other", "<p>bird bird</p>");

    let config = IndexConfig {
        keep_partials: true,
        ..IndexConfig::default()
    };
    let layout = ArtifactLayout::new(dir.path());
    build(&corpus, dir.path(), &config);

    // The h1 occurrence of "cat" counts three times (1 base + 2 boost):
    // tf(cat) = (1 + log10(3)) / log10(2), tf(dog) = (1 + log10(2)) / log10(2).
    let shard: HashMap<String, HashMap<DocId, f64>> =
        serde_json::from_str(&fs::read_to_string(layout.partial_shard(1)).unwrap()).unwrap();
    assert_eq!(shard["cat"][&1], 4.90689);
    assert_eq!(shard["dog"][&1], 4.32193);

    let engine = SearchEngine::open(&layout).unwrap();
    assert_eq!(engine.search(&["cat".to_string()]), vec!["http://boosted"]);
    assert_eq!(engine.search(&["dog".to_string()]), vec!["http://boosted"]);

    let idf = (2.0f64 / 1.0).log10();
    let cat_score = engine.posting("cat").unwrap()[&1];
    let dog_score = engine.posting("dog").unwrap()[&1];
    assert_eq!(cat_score, round5(4.90689 * idf));
    assert_eq!(dog_score, round5(4.32193 * idf));
    assert!(cat_score > dog_score);
}

#[test]
fn duplicate_content_consumes_no_doc_id() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://first", "<p>same words here</p>");
    write_page(&corpus, "a.com", "2.json", "http://copy", "<div>same words here</div>");
    write_page(&corpus, "b.com", "3.json", "http://fresh", "<p>other words</p>");

    let layout = ArtifactLayout::new(dir.path());
    let stats = build(&corpus, dir.path(), &IndexConfig::default());
    assert_eq!(stats.documents, 2);
    assert_eq!(
        fs::read_to_string(layout.document_mapping()).unwrap(),
        "http://first\nhttp://fresh\n"
    );
}

#[test]
fn unreadable_pages_are_skipped_silently() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://good", "<p>alpha beta</p>");
    fs::write(corpus.join("a.com/0broken.json"), "{not json").unwrap();
    // Empty extracted text is also a silent skip.
    write_page(&corpus, "a.com", "2.json", "http://empty", "<img src=\"x\"/>");

    let stats = build(&corpus, dir.path(), &IndexConfig::default());
    assert_eq!(stats.documents, 1);
}

#[test]
fn multi_shard_merge_keeps_each_term_once() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://one", "<p>apple banana</p>");
    write_page(&corpus, "a.com", "2.json", "http://two", "<p>banana cherry</p>");
    write_page(&corpus, "a.com", "3.json", "http://three", "<p>apple cherry</p>");

    // A threshold of one term forces a spill after every document.
    let config = IndexConfig {
        term_threshold: 1,
        keep_partials: true,
        ..IndexConfig::default()
    };
    let layout = ArtifactLayout::new(dir.path());
    let stats = build(&corpus, dir.path(), &config);
    assert_eq!(stats.documents, 3);
    assert_eq!(stats.shards, 3);
    for k in 1..=3 {
        assert!(layout.partial_shard(k).exists());
    }

    let index = read_index(&layout);
    let terms: Vec<&str> = index.iter().map(|(term, _)| term.as_str()).collect();
    assert_eq!(terms, vec!["appl", "banana", "cherri"]);

    // Shards partition the documents; every posting still carries its full
    // document frequency after the merge.
    for (term, posting) in &index {
        let df = posting[&0] as usize;
        let non_reserved = posting.keys().filter(|&&doc| doc != 0).count();
        assert_eq!(df, 2, "df of {term}");
        assert_eq!(non_reserved, 2, "doc entries of {term}");
    }

    // Round trip: each document appears in the posting of each of its terms.
    let by_term: HashMap<&str, &ParsedPosting> =
        index.iter().map(|(term, posting)| (term.as_str(), posting)).collect();
    assert!(by_term["appl"].contains_key(&1) && by_term["appl"].contains_key(&3));
    assert!(by_term["banana"].contains_key(&1) && by_term["banana"].contains_key(&2));
    assert!(by_term["cherri"].contains_key(&2) && by_term["cherri"].contains_key(&3));
}

#[test]
fn partials_are_removed_after_merge_by_default() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://one", "<p>apple banana</p>");

    let layout = ArtifactLayout::new(dir.path());
    build(&corpus, dir.path(), &IndexConfig::default());
    assert!(!layout.partial_shard(1).exists());
    assert!(layout.complete_index().exists());
}

#[test]
fn sampled_lookup_agrees_with_full_scan() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    // Enough terms across several first-character buckets that a sampling
    // interval of 3 leaves gaps between samples.
    let docs = [
        ("1.json", "http://d1", "aa ab ac ad"),
        ("2.json", "http://d2", "ae ba bb bc"),
        ("3.json", "http://d3", "bd ca cb cc"),
        ("4.json", "http://d4", "da db dc dd"),
        ("5.json", "http://d5", "aa ba ca da"),
    ];
    for (name, url, words) in docs {
        write_page(&corpus, "x.com", name, url, &format!("<p>{words}</p>"));
    }

    let config = IndexConfig {
        sample_interval: 3,
        ..IndexConfig::default()
    };
    let layout = ArtifactLayout::new(dir.path());
    build(&corpus, dir.path(), &config);

    let engine = SearchEngine::open(&layout).unwrap();
    let full_scan = read_index(&layout);
    assert!(full_scan.len() >= 10);

    // Every term retrieved through the offset buckets must match the
    // posting found by scanning the whole file.
    for (term, expected) in &full_scan {
        let found = engine
            .posting(term)
            .unwrap_or_else(|| panic!("lookup missed {term}"));
        assert_eq!(&found, expected, "posting of {term}");
    }

    // Absent terms, including ones past the last sample of a bucket and
    // ones with no bucket at all, contribute nothing.
    for absent in ["a", "az", "bz", "dz", "zebra", "0"] {
        assert!(engine.posting(absent).is_none(), "phantom posting for {absent}");
    }
}

#[test]
fn union_ranking_sums_scores_across_terms() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://both", "<p>antarctica warming</p>");
    write_page(&corpus, "a.com", "2.json", "http://warming", "<p>warming seas</p>");
    write_page(&corpus, "a.com", "3.json", "http://antarctica", "<p>antarctica ice</p>");

    let layout = ArtifactLayout::new(dir.path());
    build(&corpus, dir.path(), &IndexConfig::default());

    let engine = SearchEngine::open(&layout).unwrap();
    let urls = engine.search(&["antarctica".to_string(), "warming".to_string()]);

    // Boolean-OR retrieval: every document matching either term appears,
    // and the document holding both ranks first.
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], "http://both");
    assert!(urls.contains(&"http://warming".to_string()));
    assert!(urls.contains(&"http://antarctica".to_string()));
}

#[test]
fn empty_and_unknown_queries_return_nothing() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://a", "<p>alpha beta</p>");

    let layout = ArtifactLayout::new(dir.path());
    build(&corpus, dir.path(), &IndexConfig::default());

    let engine = SearchEngine::open(&layout).unwrap();
    assert!(engine.search(&[]).is_empty());
    assert!(engine.search(&["???".to_string()]).is_empty());
    assert!(engine.search(&["zzzzz".to_string()]).is_empty());
}

#[test]
fn stemmed_surface_forms_share_one_posting() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://running", "<p>running fast</p>");
    write_page(&corpus, "a.com", "2.json", "http://runs", "<p>runs slowly</p>");

    let layout = ArtifactLayout::new(dir.path());
    build(&corpus, dir.path(), &IndexConfig::default());

    let engine = SearchEngine::open(&layout).unwrap();
    let posting = engine.posting("run").unwrap();
    assert_eq!(posting[&0], 2.0);
    assert!(posting.contains_key(&1) && posting.contains_key(&2));

    // Either surface form retrieves both documents.
    assert_eq!(engine.search(&["running".to_string()]).len(), 2);
    assert_eq!(engine.search(&["runs".to_string()]).len(), 2);
}

#[test]
fn index_artifacts_satisfy_structural_invariants() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_page(&corpus, "a.com", "1.json", "http://one", "<p>delta alpha echo</p>");
    write_page(&corpus, "a.com", "2.json", "http://two", "<b>bravo</b> alpha foxtrot");
    write_page(&corpus, "b.com", "1.json", "http://three", "<p>charlie delta golf</p>");

    let config = IndexConfig {
        sample_interval: 2,
        term_threshold: 4,
        ..IndexConfig::default()
    };
    let layout = ArtifactLayout::new(dir.path());
    let stats = build(&corpus, dir.path(), &config);

    // Doc ids densely cover 1..=N.
    let mapping = fs::read_to_string(layout.document_mapping()).unwrap();
    assert_eq!(mapping.lines().count() as u32, stats.documents);

    let index = read_index(&layout);
    assert_eq!(index.len() as u64, stats.unique_terms);

    // Terms strictly ascend bytewise and each df counts its doc entries.
    let terms: Vec<&String> = index.iter().map(|(term, _)| term).collect();
    let mut sorted = terms.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(terms, sorted);
    for (term, posting) in &index {
        let df = posting[&0];
        let docs = posting.keys().filter(|&&doc| doc != 0).count();
        assert_eq!(df, docs as f64, "df of {term}");
        assert!(df >= 1.0);
    }

    // Every offset sample points at the line of its term.
    let mut index_file = File::open(layout.complete_index()).unwrap();
    for line in fs::read_to_string(layout.term_offsets()).unwrap().lines() {
        let (term, pos) = line.split_once(':').unwrap();
        let pos: u64 = pos.parse().unwrap();
        index_file.seek(SeekFrom::Start(pos)).unwrap();
        let mut sampled = String::new();
        BufReader::new(&index_file).read_line(&mut sampled).unwrap();
        assert!(sampled.starts_with(&format!("{term}|")));
    }

    // Character bucket ranges bracket exactly their own samples.
    let offsets = fs::read_to_string(layout.term_offsets()).unwrap();
    let ranges: HashMap<char, (u64, u64)> =
        serde_json::from_str(&fs::read_to_string(layout.char_offsets()).unwrap()).unwrap();
    for (&bucket, &(lo, hi)) in &ranges {
        let slice = std::str::from_utf8(&offsets.as_bytes()[lo as usize..hi as usize]).unwrap();
        assert!(!slice.is_empty(), "empty bucket {bucket}");
        for sample in slice.lines() {
            assert!(sample.starts_with(bucket), "bucket {bucket} holds {sample}");
        }
    }
    let covered: u64 = ranges.values().map(|&(lo, hi)| hi - lo).sum();
    assert_eq!(covered, offsets.len() as u64);
}
