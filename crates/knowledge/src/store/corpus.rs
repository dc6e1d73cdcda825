//! Corpus store: embeds chunks and queries a [`VectorStore`].

use super::VectorStore;
use crate::embeddings::{EmbeddingIdentity, EmbeddingProvider};
use crate::progress::ProgressReporter;
use crate::types::{Chunk, CollectionInfo, IngestReport, RetrievalResult, StoredChunk};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use newsdesk_core::{AppError, AppResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Default number of texts per embedding request.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Embedding requests in flight at once during ingestion.
const EMBED_CONCURRENCY: usize = 4;

/// One embedding provider composed with one storage backend.
#[derive(Clone)]
pub struct CorpusStore {
    provider: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn VectorStore>,
    batch_size: usize,
    progress: ProgressReporter,
}

impl CorpusStore {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, backend: Arc<dyn VectorStore>) -> Self {
        Self {
            provider,
            backend,
            batch_size: DEFAULT_BATCH_SIZE,
            progress: ProgressReporter::noop(),
        }
    }

    /// Set the number of chunks per embedding request (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Embed `chunks` and atomically replace `collection` with them.
    ///
    /// Batches are embedded concurrently but reassembled in chunk order.
    /// A failure anywhere leaves the previous generation untouched.
    pub async fn ingest(&self, collection: &str, chunks: Vec<Chunk>) -> AppResult<IngestReport> {
        let start = Instant::now();
        let identity = self.provider.identity();

        if chunks.is_empty() {
            return Err(AppError::Precondition(format!(
                "No chunks to ingest into '{}': every document was empty",
                collection
            )));
        }

        tracing::info!(
            "Ingesting {} chunks into '{}' using {} ({} backend)",
            chunks.len(),
            collection,
            identity,
            self.backend.backend_name()
        );

        let embeddings = self.embed_in_batches(&chunks).await?;

        let source_count = chunks
            .iter()
            .map(|c| c.source_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let generation_id = uuid::Uuid::new_v4().to_string();
        let info = CollectionInfo {
            name: collection.to_string(),
            embedding_model: identity.to_string(),
            dimensions: identity.dimensions,
            chunk_count: chunks.len(),
            source_count,
            generation_id: generation_id.clone(),
            created_at: Utc::now(),
        };

        let stored: Vec<StoredChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredChunk { chunk, embedding })
            .collect();
        let chunk_count = stored.len();

        self.backend.replace_collection(info, stored)?;
        self.progress.store(chunk_count as u64, collection);

        let duration = start.elapsed();
        tracing::info!(
            "Ingestion completed: {} chunks from {} sources in {:.2}s (generation {})",
            chunk_count,
            source_count,
            duration.as_secs_f64(),
            generation_id
        );

        Ok(IngestReport {
            collection: collection.to_string(),
            documents: source_count,
            chunks: chunk_count,
            generation_id,
            embedding_model: identity.to_string(),
            duration_secs: duration.as_secs_f64(),
        })
    }

    async fn embed_in_batches(&self, chunks: &[Chunk]) -> AppResult<Vec<Vec<f32>>> {
        let batches: Vec<Vec<String>> = chunks
            .chunks(self.batch_size)
            .map(|batch| batch.iter().map(|c| c.text.clone()).collect())
            .collect();
        let total_batches = batches.len() as u64;
        let model = self.provider.model_name().to_string();

        let results: Vec<AppResult<Vec<Vec<f32>>>> = stream::iter(batches.into_iter().enumerate())
            .map(|(i, batch)| {
                let provider = Arc::clone(&self.provider);
                let progress = self.progress.clone();
                let model = model.clone();
                async move {
                    let out = provider.embed_batch(&batch).await;
                    if out.is_ok() {
                        progress.embed(i as u64 + 1, total_batches, &model);
                    }
                    out
                }
            })
            .buffered(EMBED_CONCURRENCY)
            .collect()
            .await;

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in results {
            embeddings.extend(batch?);
        }

        if embeddings.len() != chunks.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        Ok(embeddings)
    }

    /// Up to `k` chunks nearest to `query_text`, by ascending cosine distance.
    ///
    /// # Errors
    /// - `AppError::CollectionNotFound` if `collection` was never ingested
    /// - `AppError::EmbeddingMismatch` if it was built with another embedding identity
    pub async fn query(
        &self,
        collection: &str,
        query_text: &str,
        k: usize,
    ) -> AppResult<Vec<RetrievalResult>> {
        let info = self.stats(collection)?;
        self.check_identity(&info)?;

        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query_text).await?;
        let hits = self.backend.search(collection, &query_embedding, k)?;
        // The collection may have been re-ingested since the check above.
        self.check_identity(&hits.info)?;
        let results = hits.results;

        tracing::debug!(
            collection = %collection,
            returned = results.len(),
            top_distance = ?results.first().map(|r| r.distance),
            "Query completed"
        );

        Ok(results)
    }

    /// Recorded metadata for `collection`.
    pub fn stats(&self, collection: &str) -> AppResult<CollectionInfo> {
        self.backend
            .collection_info(collection)?
            .ok_or_else(|| AppError::CollectionNotFound(collection.to_string()))
    }

    /// Every collection in the backend.
    pub fn list(&self) -> AppResult<Vec<CollectionInfo>> {
        self.backend.list_collections()
    }

    fn check_identity(&self, info: &CollectionInfo) -> AppResult<()> {
        let active = self.provider.identity();
        let recorded = EmbeddingIdentity::parse(&info.embedding_model);

        let consistent = match &recorded {
            Ok(recorded) => recorded.validate_consistency(&active).is_ok(),
            Err(_) => false,
        };

        if !consistent {
            return Err(AppError::EmbeddingMismatch {
                collection: info.name.clone(),
                recorded: info.embedding_model.clone(),
                active: active.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for CorpusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusStore")
            .field("provider", &self.provider.identity().to_string())
            .field("backend", &self.backend.backend_name())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::store::{MemoryStore, SqliteStore};
    use crate::types::SearchHits;

    fn chunk(n: usize, source: &str, text: &str) -> Chunk {
        Chunk {
            chunk_id: format!("chunk_{}", n),
            text: text.to_string(),
            source_id: source.to_string(),
        }
    }

    fn corpus(dimensions: usize, backend: Arc<dyn VectorStore>) -> CorpusStore {
        CorpusStore::new(
            Arc::new(TrigramProvider::new("trigram-v1", dimensions)),
            backend,
        )
        .with_batch_size(2)
    }

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            chunk(0, "rust.txt", "Rust ownership and borrowing rules prevent data races"),
            chunk(1, "pasta.txt", "Boil pasta in salted water until tender"),
            chunk(2, "rust.txt", "Cargo builds crates and manages dependencies"),
            chunk(3, "garden.txt", "Tomatoes need sunlight and regular watering"),
            chunk(4, "pasta.txt", "Drain pasta and toss with olive oil"),
        ]
    }

    #[tokio::test]
    async fn test_ingest_and_query() {
        let store = corpus(256, Arc::new(MemoryStore::new()));
        let report = store.ingest("kb", sample_chunks()).await.unwrap();
        assert_eq!(report.chunks, 5);
        assert_eq!(report.documents, 3);
        assert_eq!(report.embedding_model, "trigram:trigram-v1:256");

        let results = store.query("kb", "pasta boiling water", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source_id, "pasta.txt");
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_batches_reassembled_in_order() {
        let backend = Arc::new(MemoryStore::new());
        let store = corpus(128, backend.clone());
        store.ingest("kb", sample_chunks()).await.unwrap();

        let provider = TrigramProvider::new("trigram-v1", 128);
        let target = provider
            .embed("Cargo builds crates and manages dependencies")
            .await
            .unwrap();
        let results = backend.search("kb", &target, 1).unwrap().results;
        assert_eq!(results[0].text, "Cargo builds crates and manages dependencies");
        assert!(results[0].distance.abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_query_never_ingested() {
        let store = corpus(64, Arc::new(MemoryStore::new()));
        let err = store.query("kb", "anything", 5).await.unwrap_err();
        assert!(matches!(err, AppError::CollectionNotFound(name) if name == "kb"));
    }

    #[tokio::test]
    async fn test_query_zero_k() {
        let store = corpus(64, Arc::new(MemoryStore::new()));
        store.ingest("kb", sample_chunks()).await.unwrap();
        assert!(store.query("kb", "pasta", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identity_mismatch_rejected() {
        let backend: Arc<dyn VectorStore> = Arc::new(SqliteStore::in_memory().unwrap());
        corpus(128, backend.clone())
            .ingest("kb", sample_chunks())
            .await
            .unwrap();

        let err = corpus(64, backend)
            .query("kb", "pasta", 3)
            .await
            .unwrap_err();
        match err {
            AppError::EmbeddingMismatch {
                recorded, active, ..
            } => {
                assert_eq!(recorded, "trigram:trigram-v1:128");
                assert_eq!(active, "trigram:trigram-v1:64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Backend that swaps in a generation built with another embedding model
    /// just before it serves a search.
    struct SwapOnSearch {
        inner: MemoryStore,
        replacement: CollectionInfo,
    }

    impl VectorStore for SwapOnSearch {
        fn backend_name(&self) -> &str {
            "swap-on-search"
        }

        fn replace_collection(
            &self,
            info: CollectionInfo,
            chunks: Vec<StoredChunk>,
        ) -> AppResult<()> {
            self.inner.replace_collection(info, chunks)
        }

        fn search(&self, collection: &str, query: &[f32], k: usize) -> AppResult<SearchHits> {
            let chunks = vec![StoredChunk {
                chunk: chunk(0, "new.txt", "reingested"),
                embedding: vec![1.0; self.replacement.dimensions],
            }];
            self.inner.replace_collection(self.replacement.clone(), chunks)?;
            self.inner.search(collection, query, k)
        }

        fn collection_info(&self, collection: &str) -> AppResult<Option<CollectionInfo>> {
            self.inner.collection_info(collection)
        }

        fn list_collections(&self) -> AppResult<Vec<CollectionInfo>> {
            self.inner.list_collections()
        }

        fn drop_collection(&self, collection: &str) -> AppResult<bool> {
            self.inner.drop_collection(collection)
        }
    }

    #[tokio::test]
    async fn test_identity_rechecked_against_searched_generation() {
        let store = corpus(64, Arc::new(MemoryStore::new()));
        store.ingest("kb", sample_chunks()).await.unwrap();
        let mut replacement = store.stats("kb").unwrap();
        replacement.embedding_model = "trigram:trigram-v2:64".to_string();
        replacement.chunk_count = 1;

        let swapping = SwapOnSearch {
            inner: MemoryStore::new(),
            replacement,
        };
        let store = corpus(64, Arc::new(swapping));
        store.ingest("kb", sample_chunks()).await.unwrap();

        let err = store.query("kb", "pasta", 3).await.unwrap_err();
        match err {
            AppError::EmbeddingMismatch { recorded, .. } => {
                assert_eq!(recorded, "trigram:trigram-v2:64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_reingest_replaces() {
        let store = corpus(64, Arc::new(SqliteStore::in_memory().unwrap()));
        let first = store.ingest("kb", sample_chunks()).await.unwrap();
        let second = store.ingest("kb", sample_chunks()).await.unwrap();

        let info = store.stats("kb").unwrap();
        assert_eq!(info.chunk_count, 5);
        assert_eq!(info.generation_id, second.generation_id);
        assert_ne!(first.generation_id, second.generation_id);
    }

    #[tokio::test]
    async fn test_ingest_empty_is_precondition() {
        let store = corpus(64, Arc::new(MemoryStore::new()));
        let err = store.ingest("kb", Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }
}
