//! Ingestion: data directory → chunks → embedded collection.

use crate::chunker::chunk_documents;
use crate::loader::load_documents;
use crate::store::CorpusStore;
use crate::types::IngestReport;
use newsdesk_core::{AppConfig, AppResult};
use std::path::PathBuf;

/// What to ingest and how to cut it.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOptions {
    /// Directory of `.txt` files (non-recursive)
    pub data_dir: PathBuf,

    /// Collection to replace
    pub collection: String,

    /// Chunk window in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl IngestOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            data_dir: config.data_path(),
            collection: config.collection.clone(),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

/// Load, chunk and embed every document in `options.data_dir`, replacing the
/// collection wholesale.
pub async fn ingest_directory(
    store: &CorpusStore,
    options: &IngestOptions,
) -> AppResult<IngestReport> {
    tracing::info!(
        "Starting ingestion of {:?} into collection '{}'",
        options.data_dir,
        options.collection
    );

    let documents = load_documents(&options.data_dir)?;
    let total = documents.len() as u64;
    for (i, doc) in documents.iter().enumerate() {
        store.progress().load(i as u64 + 1, total, &doc.source_id);
    }

    let chunks = chunk_documents(&documents, options.chunk_size, options.chunk_overlap)?;
    store.progress().chunk(total, chunks.len());
    tracing::info!(
        "Split {} documents into {} chunks (size {}, overlap {})",
        documents.len(),
        chunks.len(),
        options.chunk_size,
        options.chunk_overlap
    );

    let mut report = store.ingest(&options.collection, chunks).await?;
    // Count loaded files, including any that produced no chunks
    report.documents = documents.len();
    Ok(report)
}
