//! Execution engine implementation.
//!
//! The engine drives a whole cleaning run: it reads input lines in
//! batches, runs the record cleaner over each batch (in parallel when
//! enabled), and funnels every accepted record into a single collator.

use crate::cleaning::cleaner::RecordCleaner;
use crate::core::counters::CounterSnapshot;
use crate::core::error::CleanerResult;
use crate::core::types::OutputRecord;
use crate::execution::collator::Collator;
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Execution options.
#[derive(Clone)]
pub struct ExecutionOptions {
    /// Whether to validate each batch in parallel.
    pub parallel: bool,
    /// Maximum number of parallel threads (0 = use all available).
    pub max_threads: usize,
    /// Number of input lines per batch.
    pub batch_size: usize,
    /// Progress callback.
    pub progress_callback: Option<Arc<ProgressCallback>>,
}

impl std::fmt::Debug for ExecutionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionOptions")
            .field("parallel", &self.parallel)
            .field("max_threads", &self.max_threads)
            .field("batch_size", &self.batch_size)
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0, // Use all available
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
            progress_callback: None,
        }
    }
}

impl ExecutionOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set maximum threads.
    pub fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads = max;
        self
    }

    /// Set the number of lines per batch (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }
}

/// Result of a cleaning run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Input lines read, including blank, malformed and header lines.
    pub lines_read: u64,
    /// Records written after the header.
    pub records_emitted: u64,
    /// Lines that produced no output.
    pub records_dropped: u64,
    /// Batches processed.
    pub batches: u64,
    /// Wall-clock duration.
    pub duration: Duration,
    /// Counter values at the end of the run.
    pub counters: CounterSnapshot,
}

/// The execution engine.
pub struct CleaningEngine {
    /// Cleaner applied to every line.
    cleaner: RecordCleaner,
    /// Default execution options.
    default_options: ExecutionOptions,
}

impl CleaningEngine {
    /// Create a new engine around a cleaner.
    pub fn new(cleaner: RecordCleaner) -> Self {
        Self {
            cleaner,
            default_options: ExecutionOptions::default(),
        }
    }

    /// Set default options.
    pub fn with_default_options(mut self, options: ExecutionOptions) -> Self {
        self.default_options = options;
        self
    }

    /// The cleaner used by this engine.
    pub fn cleaner(&self) -> &RecordCleaner {
        &self.cleaner
    }

    /// Clean `input` into `output`.
    ///
    /// Record-level problems only drop the record; reading or writing
    /// failures abort the run.
    pub fn run<R, W>(
        &self,
        input: R,
        output: W,
        options: Option<ExecutionOptions>,
    ) -> CleanerResult<RunSummary>
    where
        R: BufRead + Send,
        W: Write + Send,
    {
        let options = options.unwrap_or_else(|| self.default_options.clone());

        if options.max_threads > 0 && options.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.max_threads)
                .build()?;
            log::debug!("using dedicated pool of {} threads", options.max_threads);
            pool.install(|| self.run_batches(input, output, &options))
        } else {
            self.run_batches(input, output, &options)
        }
    }

    /// Clean one file into another.
    pub fn run_files(
        &self,
        input: &Path,
        output: &Path,
        options: Option<ExecutionOptions>,
    ) -> CleanerResult<RunSummary> {
        let reader = BufReader::new(File::open(input)?);
        let writer = BufWriter::new(File::create(output)?);
        log::info!("cleaning {} -> {}", input.display(), output.display());
        self.run(reader, writer, options)
    }

    fn run_batches<R, W>(
        &self,
        mut input: R,
        output: W,
        options: &ExecutionOptions,
    ) -> CleanerResult<RunSummary>
    where
        R: BufRead,
        W: Write,
    {
        let start_time = Instant::now();

        let mut tracker = ProgressTracker::new();
        if let Some(callback) = &options.progress_callback {
            let callback = callback.clone();
            tracker = tracker.with_callback(Box::new(move |update| callback(update)));
        }
        tracker.start();

        let mut collator = Collator::new(output);
        collator.begin()?;

        loop {
            let lines = read_batch(&mut input, options.batch_size)?;
            if lines.is_empty() {
                break;
            }

            let accepted = self.clean_batch(&lines, options.parallel);
            collator.emit_all(&accepted)?;
            tracker.batch_completed(lines.len(), accepted.len());
        }

        collator.finish()?;
        tracker.complete();

        let lines_read = tracker.lines_read();
        let records_emitted = collator.records_written();
        let summary = RunSummary {
            lines_read,
            records_emitted,
            records_dropped: lines_read - records_emitted,
            batches: tracker.batches(),
            duration: start_time.elapsed(),
            counters: self.cleaner.counters().snapshot(),
        };

        log::info!(
            "cleaned {} lines in {:?}: {} emitted, {} dropped",
            summary.lines_read,
            summary.duration,
            summary.records_emitted,
            summary.records_dropped
        );
        Ok(summary)
    }

    /// Clean one batch, keeping accepted records in input order.
    fn clean_batch(&self, lines: &[String], parallel: bool) -> Vec<OutputRecord> {
        if parallel {
            lines
                .par_iter()
                .filter_map(|line| self.cleaner.process(line).ok())
                .collect()
        } else {
            lines
                .iter()
                .filter_map(|line| self.cleaner.process(line).ok())
                .collect()
        }
    }
}

/// Read up to `batch_size` lines.
///
/// Line terminators (`\n` or `\r\n`) are stripped and invalid UTF-8 is
/// replaced rather than failing the run.
fn read_batch<R: BufRead>(input: &mut R, batch_size: usize) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::with_capacity(batch_size.min(4096));
    let mut buf = Vec::new();

    while lines.len() < batch_size {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = line {
            log::warn!(
                "input line of {} bytes is not valid UTF-8; invalid bytes replaced",
                buf.len()
            );
        }
        lines.push(line.into_owned());
    }

    Ok(lines)
}
