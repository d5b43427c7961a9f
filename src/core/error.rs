//! Error types for the inspection cleaner.
//!
//! Uses thiserror for structured errors. Two families exist:
//! - [`Rejection`]: why a single record was dropped. Never aborts a run.
//! - [`CleanerError`] / [`ConfigError`]: run-level failures (I/O, config).

use crate::core::counters::DropReason;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the cleaner.
///
/// This enum encompasses all run-level failures and enables automatic
/// conversion from the underlying library errors.
#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Collator already finished; cannot emit more records")]
    CollatorFinished,
}

/// Errors loading or validating a [`CleanerConfig`](crate::config::CleanerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid analysis window start '{value}': expected MM/dd/yyyy")]
    InvalidDate { value: String },

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}

/// A required source column that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Score,
    InspectionDate,
    Zipcode,
    ViolationCode,
}

impl RequiredField {
    /// Source column name.
    pub fn column(&self) -> &'static str {
        use crate::core::types::columns;
        match self {
            RequiredField::Score => columns::SCORE,
            RequiredField::InspectionDate => columns::INSPECTION_DATE,
            RequiredField::Zipcode => columns::ZIPCODE,
            RequiredField::ViolationCode => columns::VIOLATION_CODE,
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Why a record was dropped.
///
/// Rejections are the normal outcome for bad rows: they reduce output
/// volume and never surface as a run failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("Blank input line")]
    BlankLine,

    #[error("Malformed CSV quoting")]
    MalformedCsv,

    #[error("Header row")]
    HeaderRow,

    #[error("Missing or invalid {field}")]
    MissingRequiredField { field: RequiredField },

    #[error("Inspection date {date} is before the analysis window starting {window_start}")]
    OutOfWindow {
        date: NaiveDate,
        window_start: NaiveDate,
    },

    #[error("Unexpected failure: {detail}")]
    Unexpected { detail: String },
}

impl Rejection {
    /// Shorthand for a missing or invalid required field.
    pub fn missing(field: RequiredField) -> Self {
        Rejection::MissingRequiredField { field }
    }

    /// The drop counter this rejection increments, if any.
    ///
    /// Only the analysis window, ZIPCODE and VIOLATION CODE gates are
    /// counted; everything else is dropped silently.
    pub fn drop_reason(&self) -> Option<DropReason> {
        match self {
            Rejection::OutOfWindow { .. } => Some(DropReason::BeforeAnalysisWindow),
            Rejection::MissingRequiredField {
                field: RequiredField::Zipcode,
            } => Some(DropReason::InvalidZipcode),
            Rejection::MissingRequiredField {
                field: RequiredField::ViolationCode,
            } => Some(DropReason::InvalidViolationCode),
            _ => None,
        }
    }

    /// Whether the line still counts as an input record.
    ///
    /// Blank lines, unparseable lines and header rows are not records.
    pub fn counts_as_input(&self) -> bool {
        !matches!(
            self,
            Rejection::BlankLine | Rejection::MalformedCsv | Rejection::HeaderRow
        )
    }
}

/// Result type alias for run-level operations.
pub type CleanerResult<T> = Result<T, CleanerError>;

/// Result type alias for per-record operations.
pub type RecordResult<T> = Result<T, Rejection>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_reasons() {
        let date = NaiveDate::from_ymd_opt(2014, 12, 31).unwrap();
        let window_start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();

        assert_eq!(
            Rejection::OutOfWindow { date, window_start }.drop_reason(),
            Some(DropReason::BeforeAnalysisWindow)
        );
        assert_eq!(
            Rejection::missing(RequiredField::Zipcode).drop_reason(),
            Some(DropReason::InvalidZipcode)
        );
        assert_eq!(
            Rejection::missing(RequiredField::ViolationCode).drop_reason(),
            Some(DropReason::InvalidViolationCode)
        );
        assert_eq!(Rejection::missing(RequiredField::Score).drop_reason(), None);
        assert_eq!(
            Rejection::missing(RequiredField::InspectionDate).drop_reason(),
            None
        );
        assert_eq!(Rejection::MalformedCsv.drop_reason(), None);
    }

    #[test]
    fn test_counts_as_input() {
        assert!(!Rejection::BlankLine.counts_as_input());
        assert!(!Rejection::MalformedCsv.counts_as_input());
        assert!(!Rejection::HeaderRow.counts_as_input());
        assert!(Rejection::missing(RequiredField::Score).counts_as_input());
        assert!(Rejection::Unexpected {
            detail: "short row".to_string()
        }
        .counts_as_input());
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection::missing(RequiredField::ViolationCode);
        assert_eq!(rejection.to_string(), "Missing or invalid VIOLATION CODE");
    }
}
