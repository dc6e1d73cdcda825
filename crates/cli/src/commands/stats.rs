//! Stats command handler.
//!
//! Shows what the corpus store holds for one or every collection.

use clap::Args;
use newsdesk_core::{config::AppConfig, AppResult};
use newsdesk_knowledge::{open_corpus, CollectionInfo};

/// Show collection statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Collection to describe (default: corpus.collection from config)
    #[arg(long, conflicts_with = "all")]
    pub collection: Option<String>,

    /// Describe every collection in the store
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");
        tracing::debug!("Stats options: {:?}", self);

        let store = open_corpus(config)?;
        let collections = if self.all {
            store.list()?
        } else {
            let name = self.collection.as_deref().unwrap_or(&config.collection);
            vec![store.stats(name)?]
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&collections)?);
            return Ok(());
        }

        if collections.is_empty() {
            println!("No collections found in {:?}", config.store_file());
        }
        for info in &collections {
            print_collection(info);
        }

        Ok(())
    }
}

fn print_collection(info: &CollectionInfo) {
    println!("Collection: {}", info.name);
    println!("  Sources: {}", info.source_count);
    println!("  Chunks: {}", info.chunk_count);
    println!("  Embedding: {} ({} dims)", info.embedding_model, info.dimensions);
    println!("  Generation: {}", info.generation_id);
    println!("  Ingested at: {}", info.created_at.to_rfc3339());
}
