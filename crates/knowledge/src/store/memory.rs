//! In-process vector store.

use super::{rank, VectorStore};
use crate::types::{CollectionInfo, SearchHits, StoredChunk};
use newsdesk_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct Collection {
    info: CollectionInfo,
    chunks: Vec<StoredChunk>,
}

/// Collections kept in memory behind a `RwLock`.
///
/// A replacement is built outside the lock and swapped in as one `Arc`, so
/// searches holding the previous generation finish against it undisturbed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, name: &str) -> AppResult<Option<Arc<Collection>>> {
        let guard = self
            .collections
            .read()
            .map_err(|_| AppError::Knowledge("Memory store lock poisoned".to_string()))?;
        Ok(guard.get(name).cloned())
    }
}

impl VectorStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn replace_collection(&self, info: CollectionInfo, chunks: Vec<StoredChunk>) -> AppResult<()> {
        let name = info.name.clone();
        let fresh = Arc::new(Collection { info, chunks });

        let mut guard = self
            .collections
            .write()
            .map_err(|_| AppError::Knowledge("Memory store lock poisoned".to_string()))?;
        guard.insert(name.clone(), fresh);

        tracing::debug!(collection = %name, "Swapped in new memory collection");
        Ok(())
    }

    fn search(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
    ) -> AppResult<SearchHits> {
        let snapshot = self
            .get(collection)?
            .ok_or_else(|| AppError::CollectionNotFound(collection.to_string()))?;
        Ok(SearchHits {
            info: snapshot.info.clone(),
            results: rank(query, &snapshot.chunks, k),
        })
    }

    fn collection_info(&self, collection: &str) -> AppResult<Option<CollectionInfo>> {
        Ok(self.get(collection)?.map(|c| c.info.clone()))
    }

    fn list_collections(&self) -> AppResult<Vec<CollectionInfo>> {
        let guard = self
            .collections
            .read()
            .map_err(|_| AppError::Knowledge("Memory store lock poisoned".to_string()))?;
        let mut infos: Vec<CollectionInfo> = guard.values().map(|c| c.info.clone()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    fn drop_collection(&self, collection: &str) -> AppResult<bool> {
        let mut guard = self
            .collections
            .write()
            .map_err(|_| AppError::Knowledge("Memory store lock poisoned".to_string()))?;
        Ok(guard.remove(collection).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;
    use chrono::Utc;

    fn info(name: &str, generation: &str, chunk_count: usize) -> CollectionInfo {
        CollectionInfo {
            name: name.to_string(),
            embedding_model: "test:fixed:2".to_string(),
            dimensions: 2,
            chunk_count,
            source_count: 1,
            generation_id: generation.to_string(),
            created_at: Utc::now(),
        }
    }

    fn stored(n: usize) -> Vec<StoredChunk> {
        (0..n)
            .map(|i| StoredChunk {
                chunk: Chunk {
                    chunk_id: format!("chunk_{}", i),
                    text: format!("text {}", i),
                    source_id: "a.txt".to_string(),
                },
                embedding: vec![1.0, i as f32],
            })
            .collect()
    }

    #[test]
    fn test_search_missing_collection() {
        let store = MemoryStore::new();
        let err = store.search("nope", &[1.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, AppError::CollectionNotFound(_)));
        assert!(store.collection_info("nope").unwrap().is_none());
    }

    #[test]
    fn test_replace_swaps_generation() {
        let store = MemoryStore::new();
        store.replace_collection(info("kb", "g1", 3), stored(3)).unwrap();
        store.replace_collection(info("kb", "g2", 2), stored(2)).unwrap();

        let current = store.collection_info("kb").unwrap().unwrap();
        assert_eq!(current.generation_id, "g2");
        let hits = store.search("kb", &[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.results.len(), 2);
        assert_eq!(hits.info.generation_id, "g2");
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let store = MemoryStore::new();
        store.replace_collection(info("kb", "g1", 3), stored(3)).unwrap();

        let held = store.get("kb").unwrap().unwrap();
        store.replace_collection(info("kb", "g2", 1), stored(1)).unwrap();

        assert_eq!(held.chunks.len(), 3);
        assert_eq!(held.info.generation_id, "g1");
    }

    #[test]
    fn test_list_and_drop() {
        let store = MemoryStore::new();
        store.replace_collection(info("b", "g", 1), stored(1)).unwrap();
        store.replace_collection(info("a", "g", 1), stored(1)).unwrap();

        let names: Vec<String> = store
            .list_collections()
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        assert!(store.drop_collection("a").unwrap());
        assert!(!store.drop_collection("a").unwrap());
    }
}
