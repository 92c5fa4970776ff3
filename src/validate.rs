use crate::error::AppError;

/// Presence check for a request field. Empty and whitespace-only values
/// count as missing; the value itself is returned untrimmed.
pub fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", name))),
    }
}
