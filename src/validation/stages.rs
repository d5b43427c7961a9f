//! Individual validation stages.
//!
//! Each stage is one hard gate a record must pass before it is normalized.

use crate::core::error::{RecordResult, Rejection, RequiredField};
use crate::core::types::{columns, parse_inspection_date, parse_score, RawRecord};
use chrono::NaiveDate;

/// Trait for record validation stages.
pub trait RecordStage: Send + Sync {
    /// Name of this validation stage.
    fn name(&self) -> &str;

    /// Check a record.
    ///
    /// Returns Ok when the record may proceed, or the reason it is dropped.
    fn check(&self, record: &RawRecord) -> RecordResult<()>;
}

/// Header row detection.
///
/// Header lines may reappear anywhere in the input when files are
/// concatenated or split; a record whose first field is exactly `CAMIS`
/// is a header.
pub struct HeaderRowCheck;

impl RecordStage for HeaderRowCheck {
    fn name(&self) -> &str {
        "Header Row"
    }

    fn check(&self, record: &RawRecord) -> RecordResult<()> {
        if record.get_index(0) == Some(columns::CAMIS) {
            return Err(Rejection::HeaderRow);
        }
        Ok(())
    }
}

/// SCORE must be present and numeric.
pub struct ScoreCheck;

impl RecordStage for ScoreCheck {
    fn name(&self) -> &str {
        "Score"
    }

    fn check(&self, record: &RawRecord) -> RecordResult<()> {
        record
            .non_blank(columns::SCORE)?
            .and_then(parse_score)
            .map(|_| ())
            .ok_or_else(|| Rejection::missing(RequiredField::Score))
    }
}

/// INSPECTION DATE must parse and fall on or after the window start.
pub struct InspectionWindowCheck {
    /// First calendar day of the analysis window.
    pub window_start: NaiveDate,
}

impl InspectionWindowCheck {
    /// Create a check for the given window start.
    pub fn new(window_start: NaiveDate) -> Self {
        Self { window_start }
    }
}

impl Default for InspectionWindowCheck {
    fn default() -> Self {
        Self::new(crate::config::default_window_start())
    }
}

impl RecordStage for InspectionWindowCheck {
    fn name(&self) -> &str {
        "Inspection Window"
    }

    fn check(&self, record: &RawRecord) -> RecordResult<()> {
        let date = record
            .non_blank(columns::INSPECTION_DATE)?
            .and_then(parse_inspection_date)
            .ok_or_else(|| Rejection::missing(RequiredField::InspectionDate))?;

        if date < self.window_start {
            return Err(Rejection::OutOfWindow {
                date,
                window_start: self.window_start,
            });
        }
        Ok(())
    }
}

/// ZIPCODE must be non-blank.
pub struct ZipcodeCheck;

impl RecordStage for ZipcodeCheck {
    fn name(&self) -> &str {
        "Zipcode"
    }

    fn check(&self, record: &RawRecord) -> RecordResult<()> {
        require_non_blank(record, RequiredField::Zipcode)
    }
}

/// VIOLATION CODE must be non-blank.
pub struct ViolationCodeCheck;

impl RecordStage for ViolationCodeCheck {
    fn name(&self) -> &str {
        "Violation Code"
    }

    fn check(&self, record: &RawRecord) -> RecordResult<()> {
        require_non_blank(record, RequiredField::ViolationCode)
    }
}

fn require_non_blank(record: &RawRecord, field: RequiredField) -> RecordResult<()> {
    match record.non_blank(field.column())? {
        Some(_) => Ok(()),
        None => Err(Rejection::missing(field)),
    }
}
