//! Validation pipeline implementation.

use crate::core::error::RecordResult;
use crate::core::types::RawRecord;
use crate::validation::stages::{
    HeaderRowCheck, InspectionWindowCheck, RecordStage, ScoreCheck, ViolationCodeCheck,
    ZipcodeCheck,
};
use chrono::NaiveDate;

/// Multi-stage record validation pipeline.
///
/// Runs a series of gates over a record in order. The first failing gate
/// decides the rejection; later gates are not consulted.
pub struct ValidationPipeline {
    stages: Vec<Box<dyn RecordStage>>,
}

impl ValidationPipeline {
    /// Create a new pipeline with the given stages.
    pub fn new(stages: Vec<Box<dyn RecordStage>>) -> Self {
        Self { stages }
    }

    /// Create the default pipeline with the standard window start.
    pub fn default_pipeline() -> Self {
        Self::with_window_start(crate::config::default_window_start())
    }

    /// Create the standard pipeline for a given analysis window start.
    pub fn with_window_start(window_start: NaiveDate) -> Self {
        Self::new(vec![
            Box::new(HeaderRowCheck),
            Box::new(ScoreCheck),
            Box::new(InspectionWindowCheck::new(window_start)),
            Box::new(ZipcodeCheck),
            Box::new(ViolationCodeCheck),
        ])
    }

    /// Add a custom validation stage at the end.
    pub fn add_stage(&mut self, stage: Box<dyn RecordStage>) {
        self.stages.push(stage);
    }

    /// Names of the stages, in run order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Validate a record through all stages.
    pub fn validate(&self, record: &RawRecord) -> RecordResult<()> {
        for stage in &self.stages {
            if let Err(rejection) = stage.check(record) {
                log::trace!("stage '{}' rejected record: {}", stage.name(), rejection);
                return Err(rejection);
            }
        }
        Ok(())
    }

    /// Quick check - whether the record passes every gate.
    pub fn accepts(&self, record: &RawRecord) -> bool {
        self.validate(record).is_ok()
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}
