//! Embedding providers and identities.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingIdentity;
pub use provider::{create_provider, EmbeddingProvider};
