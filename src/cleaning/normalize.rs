//! Per-field normalization of validated records.

use crate::core::error::{RecordResult, Rejection};
use crate::core::types::{columns, parse_score, Grade, OutputRecord, RawRecord, OUTPUT_COLUMNS};

/// Value written for a blank PHONE.
pub const MISSING_PHONE: &str = "0";

/// Value written for a blank SCORE.
pub const MISSING_SCORE: &str = "0.0";

/// Builds an [`OutputRecord`] from a record that passed validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize every output column of a record.
    pub fn normalize(&self, record: &RawRecord) -> RecordResult<OutputRecord> {
        let mut values: [String; 16] = Default::default();

        for (slot, column) in values.iter_mut().zip(OUTPUT_COLUMNS) {
            let value = record.lookup(column)?.unwrap_or("");
            *slot = self.normalize_field(record, column, value)?;
        }

        Ok(OutputRecord::new(values))
    }

    /// Normalize a single, already trimmed, field value.
    fn normalize_field(
        &self,
        record: &RawRecord,
        column: &str,
        value: &str,
    ) -> RecordResult<String> {
        match column {
            columns::PHONE if value.is_empty() => Ok(MISSING_PHONE.to_string()),
            columns::GRADE if value.is_empty() => {
                // A blank score grades as 0.0, the same value it is written as
                let score = match record.lookup(columns::SCORE)?.unwrap_or("") {
                    "" => 0.0,
                    score => parse_score(score).ok_or_else(|| unparseable_score(score))?,
                };
                Ok(Grade::from_score(score)
                    .map(|grade| grade.as_str().to_string())
                    .unwrap_or_default())
            }
            columns::SCORE if value.is_empty() => Ok(MISSING_SCORE.to_string()),
            columns::SCORE => {
                let score = parse_score(value).ok_or_else(|| unparseable_score(value))?;
                Ok(truncate_score(score).to_string())
            }
            _ => Ok(value.to_string()),
        }
    }
}

/// Drop the fractional part of a score, rounding toward zero.
///
/// Values outside the `i32` range saturate and NaN becomes 0.
pub fn truncate_score(score: f64) -> i32 {
    score as i32
}

fn unparseable_score(value: &str) -> Rejection {
    Rejection::Unexpected {
        detail: format!("score '{}' is not numeric", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{input_index, INPUT_COLUMNS};

    fn record(overrides: &[(&str, &str)]) -> RawRecord {
        let mut fields: Vec<String> = INPUT_COLUMNS.iter().map(|_| String::new()).collect();
        for (name, value) in overrides {
            fields[input_index(name).unwrap()] = value.to_string();
        }
        RawRecord::new(fields)
    }

    fn normalize(overrides: &[(&str, &str)]) -> OutputRecord {
        Normalizer::new().normalize(&record(overrides)).unwrap()
    }

    #[test]
    fn test_score_truncates_toward_zero() {
        assert_eq!(normalize(&[(columns::SCORE, "15.9")]).get(columns::SCORE), Some("15"));
        assert_eq!(normalize(&[(columns::SCORE, "-2.7")]).get(columns::SCORE), Some("-2"));
        assert_eq!(normalize(&[(columns::SCORE, "12")]).get(columns::SCORE), Some("12"));
    }

    #[test]
    fn test_blank_score_and_grade() {
        let output = normalize(&[(columns::SCORE, ""), (columns::GRADE, "")]);
        assert_eq!(output.get(columns::SCORE), Some("0.0"));
        assert_eq!(output.get(columns::GRADE), Some("A"));
    }

    #[test]
    fn test_grade_derived_from_untruncated_score() {
        let output = normalize(&[(columns::SCORE, "13.9")]);
        assert_eq!(output.get(columns::SCORE), Some("13"));
        assert_eq!(output.get(columns::GRADE), Some("B"));

        assert_eq!(normalize(&[(columns::SCORE, "13")]).get(columns::GRADE), Some("A"));
        assert_eq!(normalize(&[(columns::SCORE, "27.0")]).get(columns::GRADE), Some("B"));
        assert_eq!(normalize(&[(columns::SCORE, "27.1")]).get(columns::GRADE), Some("C"));
    }

    #[test]
    fn test_existing_grade_kept() {
        let output = normalize(&[(columns::SCORE, "40"), (columns::GRADE, " Z ")]);
        assert_eq!(output.get(columns::GRADE), Some("Z"));
    }

    #[test]
    fn test_negative_score_leaves_grade_blank() {
        let output = normalize(&[(columns::SCORE, "-1")]);
        assert_eq!(output.get(columns::GRADE), Some(""));
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(
            normalize(&[(columns::SCORE, "1"), (columns::PHONE, "   ")]).get(columns::PHONE),
            Some("0")
        );
        assert_eq!(
            normalize(&[(columns::SCORE, "1"), (columns::PHONE, " 555-1234 ")]).get(columns::PHONE),
            Some("555-1234")
        );
    }

    #[test]
    fn test_other_fields_trimmed() {
        let output = normalize(&[
            (columns::SCORE, "1"),
            (columns::BUILDING, "  "),
            (columns::VIOLATION_DESCRIPTION, "  Evidence of mice.  "),
            (columns::DBA, " CAFE "),
        ]);
        assert_eq!(output.get(columns::BUILDING), Some(""));
        assert_eq!(
            output.get(columns::VIOLATION_DESCRIPTION),
            Some("Evidence of mice.")
        );
        assert_eq!(output.get(columns::DBA), Some("CAFE"));
    }

    #[test]
    fn test_truncate_score_saturates() {
        assert_eq!(truncate_score(f64::INFINITY), i32::MAX);
        assert_eq!(truncate_score(f64::NAN), 0);
        assert_eq!(truncate_score(0.99), 0);
    }
}
