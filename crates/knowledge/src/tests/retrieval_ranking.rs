//! Ranking behaviour of the vector stores with hand-built embeddings.

use crate::store::{MemoryStore, SqliteStore, VectorStore};
use crate::types::{Chunk, CollectionInfo, StoredChunk};
use chrono::Utc;
use tempfile::NamedTempFile;

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

fn stored(id: &str, text: &str, embedding: Vec<f32>) -> StoredChunk {
    StoredChunk {
        chunk: Chunk {
            chunk_id: id.to_string(),
            text: text.to_string(),
            source_id: "source1.txt".to_string(),
        },
        embedding,
    }
}

fn info(dimensions: usize, chunk_count: usize) -> CollectionInfo {
    CollectionInfo {
        name: "kb".to_string(),
        embedding_model: format!("test:fixed:{}", dimensions),
        dimensions,
        chunk_count,
        source_count: 1,
        generation_id: "gen".to_string(),
        created_at: Utc::now(),
    }
}

/// Both backends, so every ranking property is checked on each.
fn backends() -> Vec<(Box<dyn VectorStore>, Option<NamedTempFile>)> {
    let file = NamedTempFile::new().unwrap();
    let sqlite = SqliteStore::open(file.path()).unwrap();
    vec![
        (Box::new(sqlite), Some(file)),
        (Box::new(MemoryStore::new()), None),
    ]
}

#[test]
fn test_relevant_chunk_ranks_first() {
    for (store, _guard) in backends() {
        store
            .replace_collection(
                info(4, 2),
                vec![
                    stored(
                        "chunk_0",
                        "Cooking recipes for pasta",
                        normalize(&[-0.3, -0.8, 0.4, -0.2]),
                    ),
                    stored(
                        "chunk_1",
                        "Rust is a systems language",
                        normalize(&[1.0, 0.5, 0.2, 0.1]),
                    ),
                ],
            )
            .unwrap();

        let query = normalize(&[0.9, 0.4, 0.3, 0.1]);
        let results = store.search("kb", &query, 5).unwrap().results;

        assert_eq!(results.len(), 2, "{} backend", store.backend_name());
        assert_eq!(results[0].text, "Rust is a systems language");
        assert!(results[0].distance < 0.2, "distance: {}", results[0].distance);
        assert!(results[0].distance < results[1].distance);
    }
}

#[test]
fn test_distances_non_decreasing() {
    for (store, _guard) in backends() {
        store
            .replace_collection(
                info(3, 4),
                vec![
                    stored("chunk_0", "Text D", normalize(&[-1.0, 0.0, 0.0])),
                    stored("chunk_1", "Text B", normalize(&[0.7, 0.7, 0.0])),
                    stored("chunk_2", "Text C", normalize(&[0.0, 1.0, 0.0])),
                    stored("chunk_3", "Text A", normalize(&[1.0, 0.0, 0.0])),
                ],
            )
            .unwrap();

        let results = store.search("kb", &[1.0, 0.0, 0.0], 10).unwrap().results;
        let order: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(order, vec!["Text A", "Text B", "Text C", "Text D"]);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(results[0].distance.abs() < 1e-6);
        assert!((results[3].distance - 2.0).abs() < 1e-6);
    }
}

#[test]
fn test_top_k_limit_respected() {
    for (store, _guard) in backends() {
        let chunks: Vec<StoredChunk> = (1..=10)
            .map(|i| {
                stored(
                    &format!("chunk_{}", i),
                    &format!("Text {}", i),
                    normalize(&[1.0, i as f32 / 10.0, 0.0]),
                )
            })
            .collect();
        store.replace_collection(info(3, 10), chunks).unwrap();

        let results = store.search("kb", &[1.0, 0.0, 0.0], 3).unwrap().results;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].text, "Text 1");
    }
}

#[test]
fn test_equal_distances_keep_insertion_order() {
    for (store, _guard) in backends() {
        let same = normalize(&[0.5, 0.5]);
        store
            .replace_collection(
                info(2, 3),
                vec![
                    stored("chunk_0", "first", same.clone()),
                    stored("chunk_1", "second", same.clone()),
                    stored("chunk_2", "third", same),
                ],
            )
            .unwrap();

        for _ in 0..3 {
            let results = store.search("kb", &[0.0, 1.0], 2).unwrap().results;
            let order: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
            assert_eq!(order, vec!["first", "second"]);
        }
    }
}

#[test]
fn test_empty_collection_returns_no_results() {
    for (store, _guard) in backends() {
        store.replace_collection(info(3, 0), Vec::new()).unwrap();
        assert!(store.search("kb", &[1.0, 0.0, 0.0], 5).unwrap().results.is_empty());
    }
}
