//! Retrieval front door used by the query command.

use crate::store::CorpusStore;
use crate::types::RetrievalResult;
use newsdesk_core::{AppError, AppResult};

/// Fetches context passages for a query.
#[derive(Debug, Clone)]
pub struct Retriever {
    store: CorpusStore,
}

impl Retriever {
    pub fn new(store: CorpusStore) -> Self {
        Self { store }
    }

    /// Up to `k` passages nearest to `query`, closest first. No retries.
    ///
    /// # Errors
    /// `AppError::Precondition` telling the user to ingest when the
    /// collection does not exist; other store errors pass through.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        collection: &str,
    ) -> AppResult<Vec<RetrievalResult>> {
        tracing::info!("Retrieving top-{} passages from '{}'", k, collection);

        match self.store.query(collection, query, k).await {
            Err(AppError::CollectionNotFound(name)) => Err(AppError::Precondition(format!(
                "Collection '{}' not found. Run `newsdesk ingest` first.",
                name
            ))),
            other => other,
        }
    }
}

/// Render results as `Source: <file>\n<text>` blocks separated by a blank line.
pub fn format_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|r| format!("Source: {}\n{}", r.source_id, r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
