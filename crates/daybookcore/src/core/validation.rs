//! Validation of user-entered conversation input
//!
//! Every step of a conversation passes the raw message text through one of
//! these functions before anything is stored:
//! - subject and term names (trimmed, non-empty, bounded length)
//! - calendar dates in `YYYY-MM-DD` form
//! - grade values within the configured range

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::config::{grades, names};

/// Input errors reported back to the user; the conversation step is repeated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("The name cannot be empty.")]
    EmptyName,

    #[error("The name is too long (at most {max} characters).")]
    NameTooLong { max: usize },

    #[error("'{0}' is not a whole number.")]
    NotANumber(String),

    #[error("The grade must be between {min} and {max}.")]
    OutOfRange { min: i64, max: i64 },

    #[error("Invalid date format. Please use YYYY-MM-DD.")]
    InvalidDate,

    #[error("The end date cannot be before the start date ({start}).")]
    EndBeforeStart { start: NaiveDate },
}

/// Validates a subject or term name and returns it trimmed.
pub fn validate_name(text: &str) -> Result<String, InputError> {
    let name = text.trim();
    if name.is_empty() {
        return Err(InputError::EmptyName);
    }
    if name.chars().count() > names::MAX_LEN {
        return Err(InputError::NameTooLong { max: names::MAX_LEN });
    }
    Ok(name.to_string())
}

/// Parses a grade value, accepting only whole numbers in the configured range.
///
/// # Examples
/// ```
/// use daybookcore::core::validation::parse_grade_value;
///
/// assert_eq!(parse_grade_value(" 11 "), Ok(11));
/// assert!(parse_grade_value("13").is_err());
/// assert!(parse_grade_value("4.5").is_err());
/// ```
pub fn parse_grade_value(text: &str) -> Result<i64, InputError> {
    let trimmed = text.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if !(grades::MIN_VALUE..=grades::MAX_VALUE).contains(&value) {
        return Err(InputError::OutOfRange {
            min: grades::MIN_VALUE,
            max: grades::MAX_VALUE,
        });
    }
    Ok(value)
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| InputError::InvalidDate)
}

/// Parses a term end date and checks it does not precede `start`.
pub fn parse_end_date(text: &str, start: NaiveDate) -> Result<NaiveDate, InputError> {
    let end = parse_date(text)?;
    if end < start {
        return Err(InputError::EndBeforeStart { start });
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Math \n"), Ok("Math".to_string()));
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert_eq!(validate_name(""), Err(InputError::EmptyName));
        assert_eq!(validate_name("   "), Err(InputError::EmptyName));
    }

    #[test]
    fn test_validate_name_counts_chars_not_bytes() {
        let cyrillic = "М".repeat(names::MAX_LEN);
        assert!(validate_name(&cyrillic).is_ok());

        let too_long = "a".repeat(names::MAX_LEN + 1);
        assert_eq!(
            validate_name(&too_long),
            Err(InputError::NameTooLong { max: names::MAX_LEN })
        );
    }

    #[test]
    fn test_parse_grade_value_bounds() {
        assert_eq!(parse_grade_value("1"), Ok(1));
        assert_eq!(parse_grade_value("12"), Ok(12));
        assert_eq!(parse_grade_value("0"), Err(InputError::OutOfRange { min: 1, max: 12 }));
        assert_eq!(parse_grade_value("-3"), Err(InputError::OutOfRange { min: 1, max: 12 }));
    }

    #[test]
    fn test_parse_grade_value_rejects_text() {
        assert_eq!(parse_grade_value("five"), Err(InputError::NotANumber("five".to_string())));
        assert_eq!(parse_grade_value(""), Err(InputError::NotANumber(String::new())));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2023-09-01"), Ok(NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()));
        assert_eq!(parse_date("01.09.2023"), Err(InputError::InvalidDate));
        assert_eq!(parse_date("2023-02-30"), Err(InputError::InvalidDate));
    }

    #[test]
    fn test_parse_end_date_ordering() {
        let start = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        assert!(parse_end_date("2023-09-01", start).is_ok());
        assert_eq!(
            parse_end_date("2023-08-31", start),
            Err(InputError::EndBeforeStart { start })
        );
    }
}
