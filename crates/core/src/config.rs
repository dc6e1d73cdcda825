//! Configuration management for newsdesk.
//!
//! Configuration is assembled once at process start and passed by reference
//! into every component constructor. Sources, lowest precedence first:
//! - Built-in defaults
//! - Config file (`.newsdesk/config.yaml`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)
//!
//! Relative paths (data, store, artifacts) are resolved against the workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Generation providers understood by the LLM factory.
pub const KNOWN_PROVIDERS: [&str; 3] = ["ollama", "openai", "echo"];

/// Embedding providers understood by the embedding factory.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .newsdesk/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Directory of `.txt` documents to ingest
    pub data_dir: PathBuf,

    /// SQLite file backing the corpus store
    pub store_path: PathBuf,

    /// Directory receiving the rendered brief and post
    pub artifacts_dir: PathBuf,

    /// Collection name used by ingest and query
    pub collection: String,

    /// Generation provider ("ollama", "openai", "echo")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// API key for the generation provider
    pub api_key: Option<String>,

    /// Sampling temperature; zero keeps stage output reproducible
    pub temperature: f32,

    /// Embedding function settings
    pub embedding: EmbeddingSettings,

    /// Chunk window size in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    pub top_k: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding function settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name ("trigram", "ollama")
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Vector dimension
    pub dimensions: usize,

    /// Texts per embedding request
    pub batch_size: usize,

    /// Custom provider endpoint
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            batch_size: 32,
            endpoint: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    corpus: Option<CorpusSection>,
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    output: Option<OutputSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorpusSection {
    data_dir: Option<PathBuf>,
    store_path: Option<PathBuf>,
    collection: Option<String>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    batch_size: Option<usize>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputSection {
    artifacts_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            data_dir: PathBuf::from("data"),
            store_path: PathBuf::from(".newsdesk/vectorstore.sqlite"),
            artifacts_dir: PathBuf::from("artifacts"),
            collection: "knowledge_base".to_string(),
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            temperature: 0.0,
            embedding: EmbeddingSettings::default(),
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 5,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and process environment.
    ///
    /// Environment variables:
    /// - `NEWSDESK_WORKSPACE`: Workspace path (when `workspace` is `None`)
    /// - `NEWSDESK_CONFIG`: Path to config file (when `config_file` is `None`)
    /// - `NEWSDESK_PROVIDER` / `NEWSDESK_MODEL`: Generation provider and model
    /// - `NEWSDESK_API_KEY`: API key (falls back to the `apiKeyEnv` variable,
    ///   `OPENAI_API_KEY` by default)
    /// - `NEWSDESK_EMBEDDING_MODEL`: Embedding model identifier
    /// - `NEWSDESK_STORE_PATH`: Corpus store location
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use newsdesk_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with(workspace, config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup.
    pub fn load_with<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("NEWSDESK_WORKSPACE").map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env("NEWSDESK_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.newsdesk_dir().join("config.yaml"));

        let mut api_key_env = "OPENAI_API_KEY".to_string();
        if config_path.exists() {
            let file = read_config_file(&config_path)?;
            if let Some(var) = file.llm.as_ref().and_then(|l| l.api_key_env.clone()) {
                api_key_env = var;
            }
            config = config.merge_file(file);
        }

        // Environment variables override the config file
        if let Some(provider) = env("NEWSDESK_PROVIDER") {
            config.provider = provider;
        }

        if let Some(model) = env("NEWSDESK_MODEL") {
            config.model = model;
        }

        if let Some(model) = env("NEWSDESK_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if let Some(path) = env("NEWSDESK_STORE_PATH") {
            config.store_path = PathBuf::from(path);
        }

        config.api_key = env("NEWSDESK_API_KEY").or_else(|| env(&api_key_env));

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a parsed config file into this config.
    fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(corpus) = file.corpus {
            if let Some(v) = corpus.data_dir {
                self.data_dir = v;
            }
            if let Some(v) = corpus.store_path {
                self.store_path = v;
            }
            if let Some(v) = corpus.collection {
                self.collection = v;
            }
            if let Some(v) = corpus.chunk_size {
                self.chunk_size = v;
            }
            if let Some(v) = corpus.chunk_overlap {
                self.chunk_overlap = v;
            }
            if let Some(v) = corpus.top_k {
                self.top_k = v;
            }
        }

        if let Some(llm) = file.llm {
            if let Some(v) = llm.provider {
                self.provider = v;
            }
            if let Some(v) = llm.model {
                self.model = v;
            }
            if llm.endpoint.is_some() {
                self.endpoint = llm.endpoint;
            }
            if let Some(v) = llm.temperature {
                self.temperature = v;
            }
        }

        if let Some(embedding) = file.embedding {
            if let Some(v) = embedding.provider {
                self.embedding.provider = v;
            }
            if let Some(v) = embedding.model {
                self.embedding.model = v;
            }
            if let Some(v) = embedding.dimensions {
                self.embedding.dimensions = v;
            }
            if let Some(v) = embedding.batch_size {
                self.embedding.batch_size = v;
            }
            if embedding.endpoint.is_some() {
                self.embedding.endpoint = embedding.endpoint;
            }
        }

        if let Some(v) = file.output.and_then(|o| o.artifacts_dir) {
            self.artifacts_dir = v;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .newsdesk directory.
    pub fn newsdesk_dir(&self) -> PathBuf {
        self.workspace.join(".newsdesk")
    }

    /// Ensure the .newsdesk directory exists.
    pub fn ensure_newsdesk_dir(&self) -> AppResult<()> {
        let dir = self.newsdesk_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .newsdesk directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Directory holding prompt overrides (`<stage>.yml`).
    pub fn prompts_dir(&self) -> PathBuf {
        self.newsdesk_dir().join("prompts")
    }

    /// Resolved document directory.
    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    /// Resolved corpus store file.
    pub fn store_file(&self) -> PathBuf {
        self.resolve(&self.store_path)
    }

    /// Resolved artifacts directory.
    pub fn artifacts_path(&self) -> PathBuf {
        self.resolve(&self.artifacts_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate configuration before any component is built.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.provider == "openai" && self.api_key.is_none() {
            return Err(AppError::Config(
                "OpenAI provider requires an API key (set OPENAI_API_KEY or NEWSDESK_API_KEY)"
                    .to_string(),
            ));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 || self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding dimensions and batch size must be positive".to_string(),
            ));
        }

        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "Temperature {} outside 0.0-2.0",
                self.temperature
            )));
        }

        Ok(())
    }
}

fn read_config_file(path: &Path) -> AppResult<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

    serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.collection, "knowledge_base");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.temperature, 0.0);
        assert!(!config.verbose);
    }

    #[test]
    fn test_newsdesk_dir() {
        let config = AppConfig::default();
        assert!(config.newsdesk_dir().ends_with(".newsdesk"));
        assert!(config.prompts_dir().ends_with(".newsdesk/prompts"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("openai".to_string()),
            Some("gpt-4o-mini".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4o-mini");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_load_reads_yaml_then_env() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".newsdesk")).unwrap();
        std::fs::write(
            temp.path().join(".newsdesk/config.yaml"),
            r#"
corpus:
  dataDir: docs
  collection: papers
  chunkSize: 800
  chunkOverlap: 80
llm:
  provider: openai
  model: gpt-4o-mini
  apiKeyEnv: MY_KEY
embedding:
  dimensions: 256
logging:
  color: false
"#,
        )
        .unwrap();

        let env = env_from(&[("MY_KEY", "sk-test"), ("NEWSDESK_MODEL", "gpt-4o")]);
        let config = AppConfig::load_with(Some(temp.path().to_path_buf()), None, env).unwrap();

        assert_eq!(config.collection, "papers");
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 80);
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.embedding.dimensions, 256);
        assert!(config.no_color);
        assert_eq!(config.data_path(), temp.path().join("docs"));
    }

    #[test]
    fn test_load_missing_workspace() {
        let result = AppConfig::load_with(
            Some(PathBuf::from("/definitely/not/here")),
            None,
            env_from(&[]),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_openai_requires_key() {
        let config = AppConfig {
            provider: "openai".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            api_key: Some("sk-test".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_chunk_geometry() {
        let config = AppConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_validate_defaults() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
