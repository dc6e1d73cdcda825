//! Ingest command handler.
//!
//! Rebuilds a collection from the `.txt` files in the data directory.

use clap::Args;
use newsdesk_core::{config::AppConfig, AppResult};
use newsdesk_knowledge::{
    ingest_directory, open_corpus, IngestOptions, ProgressEvent, ProgressReporter,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Chunk and embed the documents in the data directory
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Directory of .txt documents (default: corpus.dataDir from config)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Collection to replace (default: corpus.collection from config)
    #[arg(long)]
    pub collection: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest options: {:?}", self);

        let mut options = IngestOptions::from_config(config);
        if let Some(dir) = &self.data_dir {
            options.data_dir = dir.clone();
        }
        if let Some(collection) = &self.collection {
            options.collection = collection.clone();
        }

        config.ensure_newsdesk_dir()?;

        let progress = ProgressReporter::new(Arc::new(|event: ProgressEvent| {
            tracing::info!("{}", event.format_simple());
        }));
        let store = open_corpus(config)?.with_progress(progress);

        let report = ingest_directory(&store, &options).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!(
                "Ingested {} documents into '{}': {} chunks embedded with {} in {:.2}s",
                report.documents,
                report.collection,
                report.chunks,
                report.embedding_model,
                report.duration_secs
            );
        }

        Ok(())
    }
}
