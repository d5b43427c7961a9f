//! The record cleaner.
//!
//! [`RecordCleaner::process`] turns one raw input line into either a
//! normalized [`OutputRecord`] or a [`Rejection`], and updates the shared
//! counters as a side effect. It holds no other state and is safe to call
//! from many threads at once.

use crate::cleaning::normalize::Normalizer;
use crate::config::CleanerConfig;
use crate::core::counters::Counters;
use crate::core::error::{ConfigError, RecordResult, Rejection};
use crate::core::types::{columns, OutputRecord, RawRecord};
use crate::validation::pipeline::ValidationPipeline;
use std::sync::Arc;

/// Cuisine counted by the per-borough American breakdown.
const AMERICAN_CUISINE: &str = "American";

/// Validates, normalizes and counts input lines.
pub struct RecordCleaner {
    pipeline: ValidationPipeline,
    normalizer: Normalizer,
    counters: Arc<Counters>,
}

impl RecordCleaner {
    /// Create a cleaner with the default pipeline and fresh counters.
    pub fn new() -> Self {
        Self::with_pipeline(ValidationPipeline::default(), Arc::new(Counters::new()))
    }

    /// Create a cleaner with a custom pipeline and shared counters.
    pub fn with_pipeline(pipeline: ValidationPipeline, counters: Arc<Counters>) -> Self {
        Self {
            pipeline,
            normalizer: Normalizer::new(),
            counters,
        }
    }

    /// Create a cleaner from a config.
    pub fn from_config(config: &CleanerConfig, counters: Arc<Counters>) -> Result<Self, ConfigError> {
        let pipeline = ValidationPipeline::with_window_start(config.window_start()?);
        Ok(Self::with_pipeline(pipeline, counters))
    }

    /// The counters this cleaner writes to.
    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    /// Process one input line and record its counters.
    pub fn process(&self, line: &str) -> RecordResult<OutputRecord> {
        let result = self.clean(line);

        match &result {
            Ok(record) => {
                self.counters.record_input();
                let borough = record.get(columns::BORO).unwrap_or("");
                let grade_a = record
                    .get(columns::GRADE)
                    .is_some_and(|grade| grade.eq_ignore_ascii_case("A"));
                let american = record
                    .get(columns::CUISINE_DESCRIPTION)
                    .is_some_and(|cuisine| cuisine.eq_ignore_ascii_case(AMERICAN_CUISINE));
                self.counters.record_valid(borough, grade_a, american);
            }
            Err(rejection) => {
                if rejection.counts_as_input() {
                    self.counters.record_input();
                }
                if let Some(reason) = rejection.drop_reason() {
                    self.counters.record_drop(reason);
                }
                log::debug!("dropped record: {}", rejection);
            }
        }

        result
    }

    /// Parse, validate and normalize without touching the counters.
    pub fn clean(&self, line: &str) -> RecordResult<OutputRecord> {
        if line.is_empty() {
            return Err(Rejection::BlankLine);
        }

        let record = RawRecord::parse(line)?;
        self.pipeline.validate(&record)?;
        self.normalizer.normalize(&record)
    }
}

impl Default for RecordCleaner {
    fn default() -> Self {
        Self::new()
    }
}
