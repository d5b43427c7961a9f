//! # Inspection Cleaner - NYC restaurant inspection CSV cleaning
//!
//! Inspection Cleaner validates and normalizes raw NYC restaurant
//! inspection records and writes them out as a cleaned CSV with a fixed
//! header, keeping per-category counters for observability.
//!
//! ## Features
//!
//! - **Staged validation**: every record passes an ordered set of gates
//!   (header skip, score, inspection window, zipcode, violation code)
//! - **Normalization**: trimmed fields, default phone and score, grades
//!   derived from the score when missing
//! - **Parallel cleaning**: batches of lines are cleaned on a rayon pool
//! - **Single collation point**: the header is written exactly once, before
//!   any record, whatever the number of workers
//! - **Counters**: concurrent totals, drop reasons and per-borough counts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use inspection_cleaner::prelude::*;
//! use std::path::Path;
//!
//! let engine = CleaningEngine::new(RecordCleaner::new());
//! let summary = engine.run_files(
//!     Path::new("inspections.csv"),
//!     Path::new("cleaned.csv"),
//!     None,
//! )?;
//!
//! for line in summary.counters.report() {
//!     println!("{}", line);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Record types, CSV syntax, errors and counters
//! - [`validation`]: Ordered record validation stages
//! - [`cleaning`]: Normalization and the per-line record cleaner
//! - [`execution`]: Batch engine, collator and progress tracking
//! - [`config`]: TOML run configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleaning;
pub mod config;
pub mod core;
pub mod execution;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use inspection_cleaner::prelude::*;
/// ```
pub mod prelude {
    // Records
    pub use crate::core::types::{
        columns, escape_field, header_line, Grade, OutputRecord, RawRecord, INPUT_COLUMNS,
        OUTPUT_COLUMNS,
    };

    // Errors
    pub use crate::core::error::{CleanerError, ConfigError, Rejection, RequiredField};

    // Counters
    pub use crate::core::counters::{CounterGroup, CounterSnapshot, Counters, DropReason};

    // Validation
    pub use crate::validation::pipeline::ValidationPipeline;
    pub use crate::validation::stages::{
        HeaderRowCheck, InspectionWindowCheck, RecordStage, ScoreCheck, ViolationCodeCheck,
        ZipcodeCheck,
    };

    // Cleaning
    pub use crate::cleaning::cleaner::RecordCleaner;
    pub use crate::cleaning::normalize::Normalizer;

    // Execution
    pub use crate::execution::collator::{Collator, CollatorState};
    pub use crate::execution::engine::{CleaningEngine, ExecutionOptions, RunSummary};
    pub use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};

    // Configuration
    pub use crate::config::CleanerConfig;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
