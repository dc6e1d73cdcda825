//! Vector storage: the [`VectorStore`] boundary, its backends, and the
//! [`CorpusStore`] that pairs a backend with an embedding provider.

mod corpus;
mod memory;
mod sqlite;

pub use corpus::CorpusStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::types::{CollectionInfo, RetrievalResult, SearchHits, StoredChunk};
use newsdesk_core::AppResult;

/// Per-collection storage of embedded chunks.
///
/// Implementations must make [`replace_collection`](Self::replace_collection)
/// atomic: a concurrent reader sees either the previous generation or the
/// new one, never a mix or an empty gap.
pub trait VectorStore: Send + Sync {
    /// Backend name for logs ("sqlite", "memory").
    fn backend_name(&self) -> &str;

    /// Drop any collection named `info.name` and store `chunks` as its new
    /// contents, in one atomic step.
    fn replace_collection(&self, info: CollectionInfo, chunks: Vec<StoredChunk>) -> AppResult<()>;

    /// Up to `k` chunks of `collection` ordered by ascending cosine distance.
    /// Ties keep insertion order. The returned info describes the same
    /// generation the chunks were read from.
    ///
    /// # Errors
    /// `AppError::CollectionNotFound` if the collection does not exist.
    fn search(&self, collection: &str, query: &[f32], k: usize) -> AppResult<SearchHits>;

    /// Recorded metadata, or `None` when the collection does not exist.
    fn collection_info(&self, collection: &str) -> AppResult<Option<CollectionInfo>>;

    /// Every collection, sorted by name.
    fn list_collections(&self) -> AppResult<Vec<CollectionInfo>>;

    /// Remove a collection. Returns whether it existed.
    fn drop_collection(&self, collection: &str) -> AppResult<bool>;
}

/// Cosine distance, `1 - cos(a, b)`. A zero vector is at distance 1 from
/// everything; mismatched lengths are maximally distant.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 2.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot / (norm_a * norm_b)
}

/// Score `candidates` (in insertion order) against `query` and keep the `k`
/// nearest. The sort is stable so equal distances keep insertion order.
pub(crate) fn rank<'a, I>(query: &[f32], candidates: I, k: usize) -> Vec<RetrievalResult>
where
    I: IntoIterator<Item = &'a StoredChunk>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<RetrievalResult> = candidates
        .into_iter()
        .map(|stored| RetrievalResult {
            text: stored.chunk.text.clone(),
            source_id: stored.chunk.source_id.clone(),
            distance: cosine_distance(query, &stored.embedding),
        })
        .collect();

    scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    scored.truncate(k);
    scored
}
