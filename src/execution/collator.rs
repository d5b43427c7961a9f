//! Single-instance collation of cleaned records.
//!
//! The collator is the one place all accepted records meet. It writes the
//! fixed header exactly once, before any record, then passes records
//! through in the order they arrive. It never sorts or deduplicates.

use crate::core::error::{CleanerError, CleanerResult};
use crate::core::types::{header_line, OutputRecord};
use std::io::Write;

/// Collator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollatorState {
    /// Nothing written yet.
    Idle,
    /// Header written, no records yet.
    HeaderEmitted,
    /// At least one record written.
    Streaming,
    /// Output flushed; no more writes accepted.
    Done,
}

/// Writes the cleaned CSV to a sink.
pub struct Collator<W: Write> {
    writer: W,
    state: CollatorState,
    records_written: u64,
}

impl<W: Write> Collator<W> {
    /// Create a collator over a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            state: CollatorState::Idle,
            records_written: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> CollatorState {
        self.state
    }

    /// Records written so far (excluding the header).
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Write the header if it has not been written yet.
    pub fn begin(&mut self) -> CleanerResult<()> {
        match self.state {
            CollatorState::Idle => {
                writeln!(self.writer, "{}", header_line())?;
                self.state = CollatorState::HeaderEmitted;
                Ok(())
            }
            CollatorState::HeaderEmitted | CollatorState::Streaming => Ok(()),
            CollatorState::Done => Err(CleanerError::CollatorFinished),
        }
    }

    /// Write one record, emitting the header first if needed.
    pub fn emit(&mut self, record: &OutputRecord) -> CleanerResult<()> {
        self.begin()?;
        writeln!(self.writer, "{}", record.to_csv_line())?;
        self.state = CollatorState::Streaming;
        self.records_written += 1;
        Ok(())
    }

    /// Write every record of an iterator.
    pub fn emit_all<'a, I>(&mut self, records: I) -> CleanerResult<usize>
    where
        I: IntoIterator<Item = &'a OutputRecord>,
    {
        let mut count = 0;
        for record in records {
            self.emit(record)?;
            count += 1;
        }
        Ok(count)
    }

    /// Flush and close the output.
    ///
    /// An empty run still produces the header line.
    pub fn finish(&mut self) -> CleanerResult<()> {
        self.begin()?;
        self.writer.flush()?;
        self.state = CollatorState::Done;
        Ok(())
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
