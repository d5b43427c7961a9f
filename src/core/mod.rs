//! Core types for the inspection cleaner.
//!
//! This module contains the foundational pieces the pipeline is built from:
//! - Column tables and the raw / output record types
//! - CSV line parsing and output escaping
//! - Error and rejection types
//! - Concurrent run counters

pub mod types;
pub mod error;
pub mod counters;

// Re-export commonly used types
pub use types::{Grade, OutputRecord, RawRecord, INPUT_COLUMNS, OUTPUT_COLUMNS};
pub use error::{CleanerError, ConfigError, Rejection, RequiredField};
pub use counters::{CounterGroup, CounterSnapshot, Counters, DropReason};
