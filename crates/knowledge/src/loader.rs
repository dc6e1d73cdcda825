//! Loads `.txt` documents from a data directory.

use crate::types::Document;
use newsdesk_core::{AppError, AppResult};
use std::path::Path;
use walkdir::WalkDir;

/// Load every `.txt` file directly inside `dir`, sorted by file name.
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Errors
/// `AppError::Precondition` if the directory is missing or holds no `.txt`
/// files.
pub fn load_documents(dir: &Path) -> AppResult<Vec<Document>> {
    if !dir.is_dir() {
        return Err(AppError::Precondition(format!(
            "Data directory {:?} not found. Create it and add .txt files.",
            dir
        )));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_text_file(path) {
            continue;
        }

        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;
        let source_id = entry.file_name().to_string_lossy().to_string();

        tracing::debug!(source = %source_id, bytes = bytes.len(), "Loaded document");
        documents.push(Document::new(
            source_id,
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
    }

    if documents.is_empty() {
        return Err(AppError::Precondition(format!(
            "No .txt files found in {:?}",
            dir
        )));
    }

    tracing::info!("Loaded {} documents from {:?}", documents.len(), dir);
    Ok(documents)
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}
