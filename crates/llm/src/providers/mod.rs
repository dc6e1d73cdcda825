//! Concrete generation providers.

mod echo;
mod ollama;
mod openai;
mod scripted;

pub use echo::EchoClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use scripted::ScriptedClient;
