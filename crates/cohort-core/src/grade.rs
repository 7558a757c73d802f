//! # Grade Validation
//!
//! Parses a grade supplied as text and checks it against the allowed range.

use crate::primitives::{MAX_GRADE, MIN_GRADE};
use crate::types::GradeError;

/// Parse `text` as a grade in `[0.0, 5.0]`.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected as
/// malformed rather than out of range.
pub fn parse_grade(text: &str) -> Result<f64, GradeError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| GradeError::InvalidFormat(text.to_string()))?;

    if !value.is_finite() {
        return Err(GradeError::InvalidFormat(text.to_string()));
    }
    if !(MIN_GRADE..=MAX_GRADE).contains(&value) {
        return Err(GradeError::OutOfRange(value));
    }

    Ok(value)
}
