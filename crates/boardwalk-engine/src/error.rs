//! Error types for the hierarchy engine

use boardwalk_domain::{BoardId, ColumnId, GatewayError, TaskId};
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors returned by engine operations
///
/// The engine never retries. `InvalidInput`, the not-found family and
/// `AlreadyExists` are terminal for the request; `Storage` may be
/// transient and is left to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Blank or malformed fields, non-future deadline, empty patch
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Referenced board does not exist
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// Referenced column does not exist
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// Destination column of a move does not exist
    #[error("destination column not found: {0}")]
    DestinationColumnNotFound(ColumnId),

    /// Referenced task does not exist
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A board title or column name collides with an existing sibling
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Underlying store failure; nothing was changed by the failed step
    #[error("{0}")]
    Storage(#[source] GatewayError),

    /// A multi-step mutation stopped after some steps took effect
    #[error("{operation} partially applied, failed at '{step}': {source}")]
    PartiallyApplied {
        /// Operation that was running
        operation: &'static str,
        /// Step that failed
        step: &'static str,
        /// Failure of that step
        #[source]
        source: GatewayError,
    },
}

impl EngineError {
    /// True for every not-found variant
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::BoardNotFound(_)
                | EngineError::ColumnNotFound(_)
                | EngineError::DestinationColumnNotFound(_)
                | EngineError::TaskNotFound(_)
        )
    }

    /// Shorthand for an `InvalidInput`
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }

    /// Map a gateway `NotFound` to `missing`, anything else through `From`
    pub(crate) fn or_missing(e: GatewayError, missing: EngineError) -> Self {
        if e.is_not_found() {
            missing
        } else {
            e.into()
        }
    }
}

impl From<GatewayError> for EngineError {
    fn from(e: GatewayError) -> Self {
        match e {
            // Authoritative uniqueness signal from the store's indexes
            GatewayError::Conflict(msg) => EngineError::AlreadyExists(msg),
            other => EngineError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_already_exists() {
        let err: EngineError = GatewayError::Conflict("title".into()).into();
        assert!(matches!(err, EngineError::AlreadyExists(_)));
    }

    #[test]
    fn test_or_missing() {
        let id = TaskId::new();
        let err = EngineError::or_missing(
            GatewayError::not_found("task", id),
            EngineError::TaskNotFound(id),
        );
        assert!(matches!(err, EngineError::TaskNotFound(found) if found == id));

        let err = EngineError::or_missing(
            GatewayError::Backend("disk".into()),
            EngineError::TaskNotFound(id),
        );
        assert!(matches!(err, EngineError::Storage(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_partial_message_names_step() {
        let err = EngineError::PartiallyApplied {
            operation: "delete_column",
            step: "close ordinal gap",
            source: GatewayError::Backend("io".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("delete_column"));
        assert!(msg.contains("close ordinal gap"));
    }
}
