//! Fixed-size sliding-window chunker.

use crate::types::{Chunk, Document};
use newsdesk_core::{AppError, AppResult};

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Split text into overlapping windows of `size` characters.
///
/// Windows start every `size - overlap` characters. Each window is trimmed
/// and dropped if nothing remains. Counting is in Unicode scalar values, so a
/// window never splits a code point.
///
/// # Errors
/// `AppError::Config` when `size == 0` or `overlap >= size`.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> AppResult<Vec<String>> {
    validate_geometry(size, overlap)?;

    let chars: Vec<char> = text.chars().collect();
    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        start += step;
    }

    Ok(chunks)
}

/// Chunk every document, numbering chunks `chunk_0`, `chunk_1`, ... across
/// the whole set in document order.
pub fn chunk_documents(
    documents: &[Document],
    size: usize,
    overlap: usize,
) -> AppResult<Vec<Chunk>> {
    validate_geometry(size, overlap)?;

    let mut chunks = Vec::new();
    for doc in documents {
        for text in chunk_text(&doc.raw_text, size, overlap)? {
            chunks.push(Chunk {
                chunk_id: format!("chunk_{}", chunks.len()),
                text,
                source_id: doc.source_id.clone(),
            });
        }
        tracing::debug!(source = %doc.source_id, total = chunks.len(), "Chunked document");
    }

    Ok(chunks)
}

fn validate_geometry(size: usize, overlap: usize) -> AppResult<()> {
    if size == 0 {
        return Err(AppError::Config("Chunk size must be greater than 0".to_string()));
    }
    if overlap >= size {
        return Err(AppError::Config(format!(
            "Chunk overlap ({}) must be smaller than chunk size ({})",
            overlap, size
        )));
    }
    Ok(())
}
