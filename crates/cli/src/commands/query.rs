//! Query command handler.
//!
//! Retrieves context for a question, runs the stage pipeline and writes the
//! brief and social post.

use clap::Args;
use newsdesk_core::{config::AppConfig, AppError, AppResult};
use newsdesk_knowledge::{format_context, open_corpus, Retriever};
use newsdesk_llm::create_client;
use newsdesk_pipeline::{save_artifacts, Pipeline, Preset, StageContext};
use std::io::{BufRead, Write};

/// Retrieve context and run the stage pipeline for a question
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// The question (prompted for on stdin when omitted)
    pub query: Vec<String>,

    /// Number of passages to retrieve (default: corpus.topK from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Stage lineup: research or newsroom
    #[arg(long, default_value = "research")]
    pub preset: String,

    /// Collection to query (default: corpus.collection from config)
    #[arg(long)]
    pub collection: Option<String>,

    /// Headline for the newsroom card (default: the question)
    #[arg(long)]
    pub title: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing query command");
        tracing::debug!("Query options: {:?}", self);

        let preset = Preset::parse(&self.preset)?;
        let query = self.resolve_query()?;
        let top_k = self.top_k.unwrap_or(config.top_k);
        if top_k == 0 {
            return Err(AppError::Config("--top-k must be at least 1".to_string()));
        }
        let collection = self.collection.as_deref().unwrap_or(&config.collection);

        // 1. Retrieve
        let retriever = Retriever::new(open_corpus(config)?);
        let results = retriever.retrieve(&query, top_k, collection).await?;
        if results.is_empty() {
            return Err(AppError::Precondition(format!(
                "No passages retrieved from '{}' for this question. \
                 Add documents and re-run ingestion.",
                collection
            )));
        }
        tracing::info!("Retrieved {} passages", results.len());

        // 2. Run the stages
        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )?;
        let pipeline = Pipeline::new(preset.stages(), client)?
            .with_model(config.model.clone())
            .with_temperature(config.temperature)
            .with_prompts_dir(config.prompts_dir());

        let date = chrono::Local::now().date_naive();
        let mut context = StageContext::new(query.clone(), format_context(&results), date);
        if let Some(title) = &self.title {
            context = context.with_title(title.clone());
        }

        let run = pipeline.run(context).await;
        let history: Vec<String> = run.history.iter().map(|s| s.to_string()).collect();
        tracing::debug!("Pipeline states: {}", history.join(" -> "));
        let context = run.finish()?;

        // 3. Assemble and save
        let (artifacts, report) = preset.assemble(&context);
        let written = save_artifacts(&config.artifacts_path(), &artifacts)?;

        if self.json {
            let output = serde_json::json!({
                "query": query,
                "preset": preset,
                "passages": results,
                "artifacts": artifacts,
                "report": report,
                "files": written,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", artifacts.brief);
            println!("{}", artifacts.social_post);
            for path in &written {
                eprintln!("Saved {}", path.display());
            }
            if report.used_fallback() {
                eprintln!("Note: some stage output was unstructured; defaults were used.");
            }
        }

        Ok(())
    }

    /// Question from the arguments, or one line read from stdin.
    fn resolve_query(&self) -> AppResult<String> {
        let query = if self.query.is_empty() {
            read_query(&mut std::io::stdin().lock(), &mut std::io::stderr())?
        } else {
            self.query.join(" ")
        };

        let query = query.trim().to_string();
        if query.is_empty() {
            return Err(AppError::Precondition("No query provided".to_string()));
        }
        Ok(query)
    }
}

fn read_query(input: &mut impl BufRead, prompt: &mut impl Write) -> AppResult<String> {
    write!(prompt, "Enter your research question: ")?;
    prompt.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}
