//! Structured extraction from free-form stage output.
//!
//! None of these functions fail. When the output does not have the expected
//! shape they return [`Extracted::Fallback`] with a usable default and log a
//! warning.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub const DEFAULT_ILLUSTRATION_PROMPT: &str = "editorial minimal illustration of the topic";
pub const DEFAULT_ILLUSTRATION_ALT: &str = "news illustration";
pub const DEFAULT_BULLETS: [&str; 3] =
    ["Context clarified", "Key points extracted", "Neutral tone kept"];
pub const DEFAULT_ONE_LINER: &str = "Here is what we found.";

/// A value pulled out of stage output, or the default used in its place.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    Structured(T),
    Fallback(T),
}

impl<T> Extracted<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Structured(v) | Self::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Structured(v) | Self::Fallback(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Illustration {
    pub prompt: String,
    pub alt: String,
}

impl Default for Illustration {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_ILLUSTRATION_PROMPT.to_string(),
            alt: DEFAULT_ILLUSTRATION_ALT.to_string(),
        }
    }
}

/// Publisher output: a markdown document and a social post.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Published {
    pub markdown: String,
    #[serde(default)]
    pub linkedin_post: String,
}

/// Parse the span from the first `{` to the last `}` as a JSON object.
pub fn extract_json_object(raw: &str) -> Extracted<Map<String, Value>> {
    let parsed = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Value>(&raw[start..=end]).ok()
        }
        _ => None,
    };

    match parsed {
        Some(Value::Object(map)) => Extracted::Structured(map),
        _ => {
            tracing::warn!("No JSON object found in stage output; using defaults");
            Extracted::Fallback(Map::new())
        }
    }
}

/// Illustration prompt and alt text; missing keys take the defaults.
pub fn extract_illustration(raw: &str) -> Extracted<Illustration> {
    let defaults = Illustration::default();
    match extract_json_object(raw) {
        Extracted::Structured(map) => {
            let field = |key: &str, default: String| {
                map.get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or(default)
            };
            Extracted::Structured(Illustration {
                prompt: field("prompt", defaults.prompt),
                alt: field("alt", defaults.alt),
            })
        }
        Extracted::Fallback(_) => Extracted::Fallback(defaults),
    }
}

/// First three `-` or `•` lines, markers stripped.
pub fn extract_bullets(text: &str) -> Extracted<Vec<String>> {
    let bullets: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || line.starts_with('•'))
        .map(|line| line.trim_matches(|c: char| c == ' ' || c == '-' || c == '•'))
        .filter(|line| !line.is_empty())
        .take(3)
        .map(str::to_string)
        .collect();

    if bullets.is_empty() {
        tracing::warn!("No bullet lines found; using default bullets");
        Extracted::Fallback(DEFAULT_BULLETS.iter().map(|b| b.to_string()).collect())
    } else {
        Extracted::Structured(bullets)
    }
}

/// Text up to the first `.`, with the period kept.
pub fn first_sentence(text: &str) -> Extracted<String> {
    let head = text.split('.').next().unwrap_or("").trim();
    if head.is_empty() {
        tracing::warn!("No leading sentence found; using default one-liner");
        Extracted::Fallback(DEFAULT_ONE_LINER.to_string())
    } else {
        Extracted::Structured(format!("{}.", head))
    }
}

fn source_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\((?:S|s)ource:\s*([^)]+)\)").ok())
        .as_ref()
}

/// Distinct `(Source: X)` citations, sorted.
pub fn extract_sources(text: &str) -> BTreeSet<String> {
    let Some(pattern) = source_pattern() else {
        return BTreeSet::new();
    };
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Body of a ```` ```json ```` fence, or the whole text when there is none.
fn unwrap_json_fence(raw: &str) -> &str {
    const FENCE: &str = "```json";
    match raw.find(FENCE) {
        Some(start) => {
            let body = &raw[start + FENCE.len()..];
            let end = body.find("```").unwrap_or(body.len());
            body[..end].trim()
        }
        None => raw.trim(),
    }
}

/// Parse publisher output. On failure the raw text becomes the markdown.
pub fn parse_published(raw: &str) -> Extracted<Published> {
    match serde_json::from_str::<Published>(unwrap_json_fence(raw)) {
        Ok(published) => Extracted::Structured(published),
        Err(e) => {
            tracing::warn!("Publisher output is not the expected JSON ({}); using raw text", e);
            Extracted::Fallback(Published {
                markdown: raw.to_string(),
                linkedin_post: String::new(),
            })
        }
    }
}
