use crate::error::ApiError;

/// A required form field: absent and empty are the same failure.
pub fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::validation(message)),
    }
}

/// Parse a form field holding a row id.
pub fn numeric_id(value: &str, message: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(message))
}
