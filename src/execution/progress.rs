//! Progress tracking for cleaning runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// The run has started.
    Started,
    /// A batch of input lines has been validated and collated.
    BatchCompleted {
        /// Zero-based batch index.
        batch: usize,
        /// Lines in this batch.
        lines: usize,
        /// Records emitted from this batch.
        emitted: usize,
        /// Lines read so far.
        total_lines: u64,
    },
    /// The run has completed.
    Completed {
        lines: u64,
        emitted: u64,
        duration_ms: u64,
    },
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Tracks run progress.
pub struct ProgressTracker {
    /// Lines read so far.
    lines_read: AtomicU64,
    /// Records emitted so far.
    records_emitted: AtomicU64,
    /// Batches completed so far.
    batches: AtomicU64,
    /// Start time.
    start_time: Option<Instant>,
    /// Progress callback.
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new() -> Self {
        Self {
            lines_read: AtomicU64::new(0),
            records_emitted: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            start_time: None,
            callback: None,
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started);
    }

    /// Report that a batch has been collated.
    pub fn batch_completed(&self, lines: usize, emitted: usize) {
        let batch = self.batches.fetch_add(1, Ordering::Relaxed) as usize;
        let total_lines = self.lines_read.fetch_add(lines as u64, Ordering::Relaxed) + lines as u64;
        self.records_emitted
            .fetch_add(emitted as u64, Ordering::Relaxed);

        self.send_update(ProgressUpdate::BatchCompleted {
            batch,
            lines,
            emitted,
            total_lines,
        });
    }

    /// Complete tracking.
    pub fn complete(&self) {
        self.send_update(ProgressUpdate::Completed {
            lines: self.lines_read(),
            emitted: self.records_emitted(),
            duration_ms: self.elapsed_ms(),
        });
    }

    /// Lines read so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    /// Records emitted so far.
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    /// Batches completed so far.
    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    /// Milliseconds since [`ProgressTracker::start`].
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
