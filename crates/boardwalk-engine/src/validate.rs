//! Precondition checks shared by the operations

use crate::error::{EngineError, EngineResult};

/// Reject blank strings, returning the trimmed value
pub(crate) fn required(field: &str, value: &str) -> EngineResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid(format!("{} must not be blank", field)));
    }
    Ok(trimmed.to_string())
}

/// Same check for an optional patch field
pub(crate) fn optional(field: &str, value: &Option<String>) -> EngineResult<Option<String>> {
    value.as_deref().map(|v| required(field, v)).transpose()
}

/// Deadlines are stored as signed seconds, so they must also fit an `i64`
pub(crate) fn future_deadline(deadline: u64, now: u64) -> EngineResult<()> {
    if i64::try_from(deadline).is_err() {
        return Err(EngineError::invalid(format!(
            "deadline {} is out of range",
            deadline
        )));
    }
    if deadline <= now {
        return Err(EngineError::invalid("deadline must be in the future"));
    }
    Ok(())
}

pub(crate) fn progress(value: u8) -> EngineResult<()> {
    if value > 100 {
        return Err(EngineError::invalid(format!(
            "progress must be between 0 and 100, got {}",
            value
        )));
    }
    Ok(())
}

/// Case-insensitive name comparison used for titles and column names
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
