//! Execution engine module.
//!
//! This module drives whole cleaning runs over an input stream.

pub mod engine;
pub mod collator;
pub mod progress;

pub use engine::{CleaningEngine, ExecutionOptions, RunSummary};
pub use collator::{Collator, CollatorState};
pub use progress::{ProgressTracker, ProgressUpdate};
