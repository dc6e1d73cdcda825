//! Ingestion progress reporting.
//!
//! Long ingestion runs emit [`ProgressEvent`]s through an optional callback;
//! every event is also logged at debug level.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Ingestion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Load,
    Chunk,
    Embed,
    Store,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Chunk => "chunk",
            Self::Embed => "embed",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress update.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: Phase,

    /// Units of work done so far (documents, batches, chunks)
    pub current: u64,

    /// Total expected units, when known
    pub total: Option<u64>,

    pub message: String,

    /// Seconds since the reporter was created
    pub elapsed_secs: f64,
}

impl ProgressEvent {
    /// Percentage complete, when the total is known.
    pub fn percentage(&self) -> Option<f64> {
        self.total.map(|t| {
            if t > 0 {
                (self.current as f64 / t as f64) * 100.0
            } else {
                100.0
            }
        })
    }

    /// Single user-facing line, e.g. `[embed] 2/4 (50%) - model=trigram-v1`.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => self.current.to_string(),
        };
        let pct = self
            .percentage()
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Emits progress events through an optional callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Reporter that only logs.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    fn emit(&self, phase: Phase, current: u64, total: Option<u64>, message: String) {
        let event = ProgressEvent {
            phase,
            current,
            total,
            message,
            elapsed_secs: self.start_time.elapsed().as_secs_f64(),
        };

        tracing::debug!(
            phase = %event.phase,
            current = event.current,
            total = ?event.total,
            message = %event.message,
            elapsed_secs = event.elapsed_secs,
            "Progress event"
        );

        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    pub fn load(&self, current: u64, total: u64, source_id: &str) {
        self.emit(Phase::Load, current, Some(total), format!("read {}", source_id));
    }

    pub fn chunk(&self, documents: u64, chunks_created: usize) {
        self.emit(
            Phase::Chunk,
            documents,
            Some(documents),
            format!("{} chunks created", chunks_created),
        );
    }

    pub fn embed(&self, batch: u64, total_batches: u64, model: &str) {
        self.emit(
            Phase::Embed,
            batch,
            Some(total_batches),
            format!("model={}", model),
        );
    }

    pub fn store(&self, chunks: u64, collection: &str) {
        self.emit(
            Phase::Store,
            chunks,
            None,
            format!("wrote collection '{}'", collection),
        );
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
