//! Generation provider crate for newsdesk.
//!
//! Stages talk to language models through the [`LlmClient`] trait: a system
//! role plus role-tagged messages in, one text reply out.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **OpenAI**: Chat completions API
//! - **Echo**: Offline stub for dry runs
//! - **Scripted**: Canned replies for tests
//!
//! # Example
//! ```no_run
//! use newsdesk_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{EchoClient, OllamaClient, OpenAiClient, ScriptedClient};
pub use types::ProviderType;
