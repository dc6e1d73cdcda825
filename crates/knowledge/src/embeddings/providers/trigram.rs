//! Offline embedding provider built from hashed word trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use newsdesk_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic, content-dependent embeddings with no model download.
///
/// Each distinct word (stop words and words under three characters dropped)
/// adds weight to the buckets of its character trigrams and of the whole
/// word. The result is L2-normalised; text with no usable words maps to the
/// zero vector.
#[derive(Debug, Clone)]
pub struct TrigramProvider {
    model: String,
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vector;
        }

        let lower = text.to_lowercase();
        let mut frequencies: HashMap<&str, u32> = HashMap::new();
        for word in lower.split_whitespace() {
            if word.chars().count() > 2 && !STOP_WORDS.contains(&word) {
                *frequencies.entry(word).or_insert(0) += 1;
            }
        }

        for (word, freq) in &frequencies {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let bucket = bucket(window.iter().copied(), 37, self.dimensions);
                vector[bucket] += (*freq as f32).sqrt();
            }
            vector[bucket(word.chars(), 31, self.dimensions)] += *freq as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

/// Polynomial hash over the UTF-8 bytes of `chars`, reduced to a bucket index.
fn bucket(chars: impl Iterator<Item = char>, multiplier: u64, dimensions: usize) -> usize {
    let mut buf = [0u8; 4];
    let hash = chars.fold(0u64, |acc, c| {
        c.encode_utf8(&mut buf)
            .bytes()
            .fold(acc, |h, b| h.wrapping_mul(multiplier).wrapping_add(b as u64))
    });
    (hash % dimensions as u64) as usize
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
