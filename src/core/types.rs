//! Record types for the inspection cleaner.
//!
//! This module defines the two record shapes that flow through the pipeline:
//! - [`RawRecord`]: one parsed line of the source inspection CSV
//! - [`OutputRecord`]: the fixed 16-column normalized row
//!
//! It also owns the CSV syntax helpers used at both ends of the pipeline
//! (strict line parsing and output escaping).

use crate::core::error::Rejection;
use chrono::NaiveDate;
use std::borrow::Cow;
use std::fmt;

/// Column names used by the cleaner.
pub mod columns {
    pub const CAMIS: &str = "CAMIS";
    pub const DBA: &str = "DBA";
    pub const BORO: &str = "BORO";
    pub const BUILDING: &str = "BUILDING";
    pub const STREET: &str = "STREET";
    pub const ZIPCODE: &str = "ZIPCODE";
    pub const PHONE: &str = "PHONE";
    pub const CUISINE_DESCRIPTION: &str = "CUISINE DESCRIPTION";
    pub const INSPECTION_DATE: &str = "INSPECTION DATE";
    pub const ACTION: &str = "ACTION";
    pub const VIOLATION_CODE: &str = "VIOLATION CODE";
    pub const VIOLATION_DESCRIPTION: &str = "VIOLATION DESCRIPTION";
    pub const CRITICAL_FLAG: &str = "CRITICAL FLAG";
    pub const SCORE: &str = "SCORE";
    pub const GRADE: &str = "GRADE";
    pub const GRADE_DATE: &str = "GRADE DATE";
    pub const RECORD_DATE: &str = "RECORD DATE";
    pub const INSPECTION_TYPE: &str = "INSPECTION TYPE";
}

use columns::*;

/// Columns of the source CSV, in file order.
pub const INPUT_COLUMNS: [&str; 27] = [
    CAMIS,
    DBA,
    BORO,
    BUILDING,
    STREET,
    ZIPCODE,
    PHONE,
    CUISINE_DESCRIPTION,
    INSPECTION_DATE,
    ACTION,
    VIOLATION_CODE,
    VIOLATION_DESCRIPTION,
    CRITICAL_FLAG,
    SCORE,
    GRADE,
    GRADE_DATE,
    RECORD_DATE,
    INSPECTION_TYPE,
    "Latitude",
    "Longitude",
    "Community Board",
    "Council District",
    "Census Tract",
    "BIN",
    "BBL",
    "NTA",
    "Location",
];

/// Columns of the cleaned CSV, in output order.
pub const OUTPUT_COLUMNS: [&str; 16] = [
    INSPECTION_DATE,
    CAMIS,
    DBA,
    BORO,
    BUILDING,
    STREET,
    ZIPCODE,
    PHONE,
    CUISINE_DESCRIPTION,
    ACTION,
    VIOLATION_CODE,
    VIOLATION_DESCRIPTION,
    CRITICAL_FLAG,
    SCORE,
    GRADE,
    INSPECTION_TYPE,
];

/// Date pattern of the INSPECTION DATE column (`MM/dd/yyyy`).
pub const INSPECTION_DATE_FORMAT: &str = "%m/%d/%Y";

/// Resolve a source column name to its index.
pub fn input_index(name: &str) -> Option<usize> {
    INPUT_COLUMNS.iter().position(|column| *column == name)
}

/// Resolve an output column name to its index.
pub fn output_index(name: &str) -> Option<usize> {
    OUTPUT_COLUMNS.iter().position(|column| *column == name)
}

/// The header line of the cleaned CSV.
pub fn header_line() -> String {
    OUTPUT_COLUMNS.join(",")
}

/// Parse a score the way the source data writes it (`"12"`, `"13.9"`).
///
/// Non-finite values are only accepted in the exact `NaN` and `Infinity`
/// spellings (optionally signed); `inf`, `nan` and other case variants are
/// rejected.
pub fn parse_score(value: &str) -> Option<f64> {
    let value = value.trim();
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);

    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return match unsigned {
            "NaN" => Some(f64::NAN),
            "Infinity" if value.starts_with('-') => Some(f64::NEG_INFINITY),
            "Infinity" => Some(f64::INFINITY),
            _ => None,
        };
    }

    value.parse::<f64>().ok()
}

/// Parse an inspection date.
///
/// Trailing text after the date (such as a time of day) is ignored, so
/// `"03/14/2019 12:00:00 AM"` yields 2019-03-14.
pub fn parse_inspection_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_and_remainder(value.trim(), INSPECTION_DATE_FORMAT)
        .ok()
        .map(|(date, _)| date)
}

// ============================================================================
// Grade
// ============================================================================

/// Letter grade derived from an inspection score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    /// Score 0 to 13.
    A,
    /// Score above 13, up to 27.
    B,
    /// Score above 27.
    C,
}

impl Grade {
    /// Derive a grade from the untruncated score.
    ///
    /// `[0, 13]` is A, `(13, 27]` is B, anything above 27 is C. Negative and
    /// NaN scores fall in no tier and yield `None`.
    pub fn from_score(score: f64) -> Option<Self> {
        if (0.0..=13.0).contains(&score) {
            Some(Grade::A)
        } else if score > 13.0 && score <= 27.0 {
            Some(Grade::B)
        } else if score > 27.0 {
            Some(Grade::C)
        } else {
            None
        }
    }

    /// The letter as written in the output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Raw Record
// ============================================================================

/// One parsed line of the source CSV.
///
/// Fields are kept exactly as parsed; [`RawRecord::lookup`] trims on access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<String>,
}

impl RawRecord {
    /// Create a record from already-split fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Parse one CSV line.
    ///
    /// Fields are comma separated and may be enclosed in double quotes, with
    /// `""` standing for a literal quote inside a quoted field. A quoted field
    /// that is never closed, or a closing quote followed by anything other
    /// than blanks and a delimiter, makes the line malformed. Blanks after a
    /// closing quote are not part of the value.
    pub fn parse(line: &str) -> Result<Self, Rejection> {
        let padded = check_quoting(line)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());

        let mut fields: Vec<String> = match reader.records().next() {
            Some(Ok(record)) => record.iter().map(str::to_string).collect(),
            Some(Err(_)) | None => return Err(Rejection::MalformedCsv),
        };

        // The reader keeps blanks that follow a closing quote; drop them
        for (index, blanks) in padded {
            if let Some(value) = fields.get_mut(index) {
                let keep = value.len().saturating_sub(blanks);
                value.truncate(keep);
            }
        }

        Ok(Self { fields })
    }

    /// Number of parsed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at a raw position, untrimmed.
    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Look up a field by column name, trimmed.
    ///
    /// Returns `Ok(None)` when the name is not a source column. A known column
    /// beyond the end of a short row is an internal error rather than an
    /// absent field.
    pub fn lookup(&self, name: &str) -> Result<Option<&str>, Rejection> {
        let Some(index) = input_index(name) else {
            return Ok(None);
        };

        self.fields
            .get(index)
            .map(|value| Some(value.trim()))
            .ok_or_else(|| Rejection::Unexpected {
                detail: format!(
                    "column '{}' (index {}) missing from a {}-field row",
                    name,
                    index,
                    self.fields.len()
                ),
            })
    }

    /// Look up a field and treat absent or blank as `None`.
    pub fn non_blank(&self, name: &str) -> Result<Option<&str>, Rejection> {
        Ok(self.lookup(name)?.filter(|value| !value.is_empty()))
    }
}

/// Verify the quoting of a single CSV line.
///
/// Returns, for every quoted field followed by blanks before its delimiter,
/// the field position and the number of blanks.
fn check_quoting(line: &str) -> Result<Vec<(usize, usize)>, Rejection> {
    let mut padded = Vec::new();
    let mut chars = line.chars().peekable();
    let mut field = 0;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if !(at_field_start && c == '"') {
            at_field_start = c == ',';
            if at_field_start {
                field += 1;
            }
            continue;
        }

        // Inside a quoted field
        loop {
            match chars.next() {
                None => return Err(Rejection::MalformedCsv),
                Some('"') if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                Some('"') => break,
                Some(_) => {}
            }
        }

        // Only blanks may sit between a closing quote and the delimiter
        let mut blanks = 0;
        loop {
            match chars.next() {
                None => break,
                Some(',') => {
                    at_field_start = true;
                    break;
                }
                Some(' ') | Some('\t') => blanks += 1,
                Some(_) => return Err(Rejection::MalformedCsv),
            }
        }
        if blanks > 0 {
            padded.push((field, blanks));
        }
        if at_field_start {
            field += 1;
        }
    }

    Ok(padded)
}

/// Escape a value for the output CSV.
///
/// Values containing a comma or a double quote are wrapped in quotes with
/// inner quotes doubled. Everything else is written as is.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains(',') || value.contains('"') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

// ============================================================================
// Output Record
// ============================================================================

/// A normalized row of the cleaned CSV.
///
/// Values are stored unescaped in [`OUTPUT_COLUMNS`] order and escaped when
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRecord {
    values: [String; 16],
}

impl OutputRecord {
    /// Create a record from normalized values in output column order.
    pub fn new(values: [String; 16]) -> Self {
        Self { values }
    }

    /// Value of an output column.
    pub fn get(&self, column: &str) -> Option<&str> {
        output_index(column).map(|index| self.values[index].as_str())
    }

    /// All values in output column order.
    pub fn values(&self) -> &[String; 16] {
        &self.values
    }

    /// Serialize as one CSV line (without the trailing newline).
    pub fn to_csv_line(&self) -> String {
        self.values
            .iter()
            .map(|value| escape_field(value))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(overrides: &[(&str, &str)]) -> String {
        let mut fields: Vec<String> = INPUT_COLUMNS.iter().map(|_| String::new()).collect();
        for (name, value) in overrides {
            fields[input_index(name).unwrap()] = value.to_string();
        }
        fields
            .iter()
            .map(|f| escape_field(f).into_owned())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_column_tables() {
        assert_eq!(input_index(CAMIS), Some(0));
        assert_eq!(input_index(SCORE), Some(13));
        assert_eq!(input_index("Location"), Some(26));
        assert_eq!(input_index("NOT A COLUMN"), None);
        assert_eq!(output_index(INSPECTION_DATE), Some(0));
        assert_eq!(output_index(INSPECTION_TYPE), Some(15));
    }

    #[test]
    fn test_parse_score_spellings() {
        assert_eq!(parse_score(" 12 "), Some(12.0));
        assert_eq!(parse_score("13.9"), Some(13.9));
        assert_eq!(parse_score("-2"), Some(-2.0));
        assert_eq!(parse_score("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_score("-Infinity"), Some(f64::NEG_INFINITY));
        assert!(parse_score("NaN").is_some_and(f64::is_nan));

        for rejected in ["inf", "INF", "infinity", "+inf", "nan", "NAN", "abc", ""] {
            assert_eq!(parse_score(rejected), None, "{rejected:?}");
        }
    }

    #[test]
    fn test_header_line() {
        assert_eq!(
            header_line(),
            "INSPECTION DATE,CAMIS,DBA,BORO,BUILDING,STREET,ZIPCODE,PHONE,CUISINE DESCRIPTION,\
             ACTION,VIOLATION CODE,VIOLATION DESCRIPTION,CRITICAL FLAG,SCORE,GRADE,INSPECTION TYPE"
        );
    }

    #[test]
    fn test_parse_quoted_fields() {
        let record = RawRecord::parse(r#"1,"Joe's ""Diner"", Inc.",BRONX"#).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get_index(1), Some(r#"Joe's "Diner", Inc."#));
        assert_eq!(record.get_index(2), Some("BRONX"));
    }

    #[test]
    fn test_parse_literal_quote_in_unquoted_field() {
        let record = RawRecord::parse(r#"a,b"c,d"#).unwrap();
        assert_eq!(record.get_index(1), Some(r#"b"c"#));
    }

    #[test]
    fn test_parse_unbalanced_quote_is_malformed() {
        assert_eq!(
            RawRecord::parse(r#"1,"unterminated,BRONX"#),
            Err(Rejection::MalformedCsv)
        );
    }

    #[test]
    fn test_parse_text_after_closing_quote_is_malformed() {
        assert_eq!(
            RawRecord::parse(r#"1,"quoted"tail,BRONX"#),
            Err(Rejection::MalformedCsv)
        );
    }

    #[test]
    fn test_parse_drops_blanks_after_closing_quote() {
        let record = RawRecord::parse("1,\"quoted \"  ,\"tab\"\t,plain ,\"end\" ").unwrap();
        assert_eq!(record.len(), 5);
        assert_eq!(record.get_index(1), Some("quoted "));
        assert_eq!(record.get_index(2), Some("tab"));
        assert_eq!(record.get_index(3), Some("plain "));
        assert_eq!(record.get_index(4), Some("end"));
    }

    #[test]
    fn test_lookup_absent_vs_empty() {
        let record = RawRecord::parse(&row(&[(SCORE, " 12 ")])).unwrap();
        assert_eq!(record.lookup(SCORE).unwrap(), Some("12"));
        assert_eq!(record.lookup(ZIPCODE).unwrap(), Some(""));
        assert_eq!(record.lookup("Not A Column").unwrap(), None);
        assert_eq!(record.non_blank(ZIPCODE).unwrap(), None);
    }

    #[test]
    fn test_lookup_past_end_of_short_row() {
        let record = RawRecord::parse("1,DBA,BRONX").unwrap();
        assert!(matches!(record.lookup(SCORE), Err(Rejection::Unexpected { .. })));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(
            escape_field(r#"Joe's "Diner", Inc."#),
            r#""Joe's ""Diner"", Inc.""#
        );
    }

    #[test]
    fn test_escaped_value_reparses_unchanged() {
        let value = r#"Joe's "Diner", Inc."#;
        let line = format!("x,{},y", escape_field(value));
        let record = RawRecord::parse(&line).unwrap();
        assert_eq!(record.get_index(1), Some(value));
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_score(0.0), Some(Grade::A));
        assert_eq!(Grade::from_score(13.0), Some(Grade::A));
        assert_eq!(Grade::from_score(13.9), Some(Grade::B));
        assert_eq!(Grade::from_score(27.0), Some(Grade::B));
        assert_eq!(Grade::from_score(27.1), Some(Grade::C));
        assert_eq!(Grade::from_score(-1.0), None);
        assert_eq!(Grade::from_score(f64::NAN), None);
    }

    #[test]
    fn test_parse_inspection_date() {
        assert_eq!(
            parse_inspection_date("01/01/2015"),
            NaiveDate::from_ymd_opt(2015, 1, 1)
        );
        assert_eq!(
            parse_inspection_date("03/14/2019 12:00:00 AM"),
            NaiveDate::from_ymd_opt(2019, 3, 14)
        );
        assert_eq!(parse_inspection_date("2015-01-01"), None);
        assert_eq!(parse_inspection_date(""), None);
    }

    #[test]
    fn test_output_record_serialization() {
        let mut values: [String; 16] = Default::default();
        values[2] = r#"Joe's "Diner", Inc."#.to_string();
        values[13] = "15".to_string();
        let record = OutputRecord::new(values);

        assert_eq!(record.get(DBA), Some(r#"Joe's "Diner", Inc."#));
        assert_eq!(record.get(SCORE), Some("15"));
        assert_eq!(record.get("Latitude"), None);
        assert_eq!(
            record.to_csv_line(),
            r#",,"Joe's ""Diner"", Inc.",,,,,,,,,,,15,,"#
        );
    }
}
