use thiserror::Error;

/// Local, pre-request validation failures of a form draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("{0} must be a whole number")]
    NotAnInteger(&'static str),
    #[error("{0} must be a date in YYYY-MM-DD format")]
    NotADate(&'static str),
    #[error("{0} must be a positive id")]
    NotAnId(&'static str),
}

/// Trimmed contents of a required text field.
pub(crate) fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DraftError::Required(field))
    } else {
        Ok(trimmed)
    }
}

/// A required decimal field; rejects NaN and infinities.
pub(crate) fn required_number(value: &str, field: &'static str) -> Result<f64, DraftError> {
    required(value, field)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(DraftError::NotANumber(field))
}
