//! Field validation for incoming reports and comments.

use crate::error::CoreError;
use crate::geo;

/// Validate the required fields of a new issue report.
///
/// Severity arrives already parsed (its `FromStr` produces the validation
/// error), so only the free-text fields and coordinates are checked here.
pub fn validate_report(
    title: &str,
    category: &str,
    city: &str,
    latitude: f64,
    longitude: f64,
) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title is required".to_string()));
    }
    if category.trim().is_empty() {
        return Err(CoreError::Validation("Category is required".to_string()));
    }
    if city.trim().is_empty() {
        return Err(CoreError::Validation("City is required".to_string()));
    }
    geo::validate_coordinates(latitude, longitude)
}

/// Trim a comment and reject blank input. Returns the trimmed text that
/// gets persisted.
pub fn validate_comment(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Comment cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
