//! Form validation.
//!
//! Raw form strings come in, typed records go out. Numeric parsing is strict:
//! anything that is not a finite decimal number is rejected.

mod forms;

pub use forms::*;

use thiserror::Error;

/// Validation errors, reported per field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    #[error("Invalid date (expected YYYY-MM-DD): {0:?}")]
    InvalidDate(String),

    #[error("Unknown gender: {0:?}")]
    UnknownGender(String),

    #[error("Circumferences cannot produce a body-fat estimate: {0}")]
    CircumferenceDomain(&'static str),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Required text field.
pub(crate) fn required_text(field: &'static str, value: &str) -> ValidationResult<String> {
    non_blank(value)
        .map(str::to_string)
        .ok_or(ValidationError::MissingField(field))
}

/// Parse a finite number.
pub(crate) fn parse_number(field: &'static str, value: &str) -> ValidationResult<f64> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::NotANumber {
            field,
            value: trimmed.to_string(),
        }),
    }
}

/// Required number that must be strictly positive.
pub(crate) fn required_positive(field: &'static str, value: &str) -> ValidationResult<f64> {
    let raw = non_blank(value).ok_or(ValidationError::MissingField(field))?;
    let n = parse_number(field, raw)?;
    if n <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(n)
}

/// Required number that must not be negative.
pub(crate) fn required_non_negative(field: &'static str, value: &str) -> ValidationResult<f64> {
    let raw = non_blank(value).ok_or(ValidationError::MissingField(field))?;
    non_negative(field, raw)
}

pub(crate) fn non_negative(field: &'static str, value: &str) -> ValidationResult<f64> {
    let n = parse_number(field, value)?;
    if n < 0.0 {
        return Err(ValidationError::OutOfRange {
            field,
            reason: "must not be negative".into(),
        });
    }
    Ok(n)
}
