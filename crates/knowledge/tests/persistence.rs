//! Vector store persistence and relevance filtering.

mod common;

use common::{KeywordEmbedder, CONTRACT, FORECAST};
use docbrain_knowledge::index::{load_store, save_entries};
use docbrain_knowledge::retriever::filter_relevant;
use docbrain_knowledge::{Chunk, IndexEntry, SearchHit, VectorStore};
use tempfile::TempDir;

fn entry(text: &str, source: &str, sequence_index: usize) -> IndexEntry {
    IndexEntry::new(
        Chunk {
            text: text.to_string(),
            source: source.to_string(),
            sequence_index,
            char_start: 0,
        },
        KeywordEmbedder::vector(text),
    )
}

#[test]
fn test_round_trip_preserves_results_and_scores() {
    let temp = TempDir::new().unwrap();
    let entries = vec![
        entry(CONTRACT, "contract.pdf", 0),
        entry(FORECAST, "forecast.txt", 0),
        entry("The rust compiler checks every salary calculation.", "notes.md", 0),
        entry("Vacation days accrue monthly for every employee.", "handbook.txt", 0),
    ];

    let mut store = VectorStore::new();
    store.insert(entries.clone()).unwrap();
    save_entries(temp.path(), store.dimension().unwrap(), 0, &entries).unwrap();

    let loaded = load_store(temp.path()).unwrap().unwrap();
    assert_eq!(loaded.len(), store.len());
    assert_eq!(loaded.dimension(), store.dimension());

    for question in ["What is the salary?", "Will it rain?", "employee vacation policy"] {
        let query = KeywordEmbedder::vector(question);
        let before = store.search(&query, 4).unwrap();
        let after = loaded.search(&query, 4).unwrap();

        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.chunk, b.chunk);
            assert_eq!(a.score, b.score);
        }
    }
}

#[test]
fn test_timestamps_survive_round_trip() {
    let temp = TempDir::new().unwrap();
    let entries = vec![entry(CONTRACT, "contract.pdf", 0)];
    save_entries(temp.path(), common::VOCABULARY.len() + 1, 0, &entries).unwrap();

    let loaded = load_store(temp.path()).unwrap().unwrap();
    assert_eq!(
        loaded.entries()[0].ingested_at.timestamp_micros(),
        entries[0].ingested_at.timestamp_micros()
    );
}

#[test]
fn test_relevance_filter_thresholds() {
    let hit = |text: &str, score: Option<f32>| SearchHit {
        chunk: Chunk {
            text: text.to_string(),
            source: "doc.txt".to_string(),
            sequence_index: 0,
            char_start: 0,
        },
        score,
    };

    let kept = filter_relevant(vec![
        hit("weak", Some(0.2)),
        hit("strong", Some(0.5)),
        hit("unscored", None),
    ]);

    let texts: Vec<&str> = kept.iter().map(|h| h.chunk.text.as_str()).collect();
    assert_eq!(texts, vec!["strong", "unscored"]);
}
