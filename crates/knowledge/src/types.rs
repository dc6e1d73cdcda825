//! Core types for the corpus store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A plain-text document loaded from the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name, used as the citation label
    pub source_id: String,

    /// Full text content
    pub raw_text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// A window of a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// `chunk_{n}`, sequential within one ingestion run
    pub chunk_id: String,

    /// Trimmed, non-empty text
    pub text: String,

    /// Document the chunk was cut from
    pub source_id: String,
}

/// A chunk paired with its embedding, as held by a [`crate::store::VectorStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// One nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub text: String,
    pub source_id: String,
    /// Cosine distance (`1 - cosine similarity`), lower is closer
    pub distance: f32,
}

/// Ranked hits plus the metadata of the generation they were ranked against.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHits {
    pub info: CollectionInfo,
    pub results: Vec<RetrievalResult>,
}

/// Metadata recorded for a collection at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name
    pub name: String,

    /// Embedding identity (`provider:model:dimensions`) used to build it
    pub embedding_model: String,

    /// Vector dimensions
    pub dimensions: usize,

    /// Number of chunks stored
    pub chunk_count: usize,

    /// Number of distinct source documents
    pub source_count: usize,

    /// Identifier of the ingestion run that produced the collection
    pub generation_id: String,

    /// When the generation was written
    pub created_at: DateTime<Utc>,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub collection: String,
    pub documents: usize,
    pub chunks: usize,
    pub generation_id: String,
    pub embedding_model: String,
    pub duration_secs: f64,
}
