//! Validation module for per-record gating.
//!
//! The validation pipeline runs before normalization so that only records
//! passing every gate are turned into output rows.

pub mod pipeline;
pub mod stages;

pub use pipeline::ValidationPipeline;
pub use stages::{
    HeaderRowCheck, InspectionWindowCheck, RecordStage, ScoreCheck, ViolationCodeCheck,
    ZipcodeCheck,
};
