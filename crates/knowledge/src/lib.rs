//! Corpus store for newsdesk.
//!
//! Loads plain-text documents, cuts them into overlapping chunks, embeds them
//! and answers nearest-neighbour queries against a per-collection vector
//! store.

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod progress;
pub mod retriever;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::{chunk_documents, chunk_text};
pub use embeddings::{create_provider, EmbeddingIdentity, EmbeddingProvider};
pub use ingest::{ingest_directory, IngestOptions};
pub use loader::load_documents;
pub use progress::{ProgressEvent, ProgressReporter};
pub use retriever::{format_context, Retriever};
pub use store::{CorpusStore, MemoryStore, SqliteStore, VectorStore};
pub use types::{
    Chunk, CollectionInfo, Document, IngestReport, RetrievalResult, SearchHits,
};

use newsdesk_core::{AppConfig, AppResult};
use std::sync::Arc;

/// Open the persistent corpus store described by `config`.
pub fn open_corpus(config: &AppConfig) -> AppResult<CorpusStore> {
    let provider = create_provider(&config.embedding)?;
    let backend = SqliteStore::open(&config.store_file())?;

    tracing::debug!(
        "Opened corpus store at {:?} with embeddings {}",
        config.store_file(),
        provider.identity()
    );

    Ok(CorpusStore::new(provider, Arc::new(backend)).with_batch_size(config.embedding.batch_size))
}
