//! Trait definitions for external interactions
//!
//! These traits define the boundary between the hierarchy rules and
//! persistence. Infrastructure implementations live in other crates.

use crate::{
    Board, BoardId, BoardPatch, Column, ColumnId, ColumnPatch, SubtreeRemoval, Task, TaskId,
    TaskPatch,
};
use std::fmt;

/// Failure reported by a storage gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The targeted entity does not exist
    NotFound {
        /// Entity kind ("board", "column", "task")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A uniqueness constraint rejected the write
    Conflict(String),

    /// The store does not provide an optional capability
    Unsupported(&'static str),

    /// Any other backend failure
    Backend(String),
}

impl GatewayError {
    /// Shorthand for a `NotFound` on the given entity kind
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        GatewayError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NotFound { entity, id } => write!(f, "{} not found: {}", entity, id),
            GatewayError::Conflict(msg) => write!(f, "uniqueness conflict: {}", msg),
            GatewayError::Unsupported(what) => write!(f, "unsupported by store: {}", what),
            GatewayError::Backend(msg) => write!(f, "storage failure: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Persistence for boards, columns and tasks
///
/// Implemented by the infrastructure layer (boardwalk-store). Lookups
/// return `Ok(None)` for absent ids; mutations targeting an absent id
/// return [`GatewayError::NotFound`].
pub trait HierarchyStore {
    /// Persist a board together with its preset columns as one unit
    fn insert_board(&mut self, board: &Board, columns: &[Column]) -> Result<(), GatewayError>;

    /// Get a board by id
    fn find_board(&self, id: BoardId) -> Result<Option<Board>, GatewayError>;

    /// List boards, optionally only those of one owner
    fn find_boards(&self, owner_id: Option<&str>) -> Result<Vec<Board>, GatewayError>;

    /// Apply the supplied patch fields and set `updated_at`
    fn update_board(
        &mut self,
        id: BoardId,
        patch: &BoardPatch,
        updated_at: u64,
    ) -> Result<Board, GatewayError>;

    /// Delete a single board row (no cascade)
    fn delete_board(&mut self, id: BoardId) -> Result<(), GatewayError>;

    /// Atomically increment the column counter, returning the new value
    ///
    /// The returned value is directly usable as the ordinal of a column
    /// appended at the end of the board.
    fn increment_column_count(&mut self, id: BoardId) -> Result<u32, GatewayError>;

    /// Atomically decrement the column counter, returning the new value
    fn decrement_column_count(&mut self, id: BoardId) -> Result<u32, GatewayError>;

    /// Delete a board with all its columns and their tasks as one atomic unit
    ///
    /// Stores without multi-statement transactions keep the default, which
    /// reports [`GatewayError::Unsupported`]; callers then fall back to an
    /// explicit compensation protocol.
    fn delete_board_tree(&mut self, id: BoardId) -> Result<SubtreeRemoval, GatewayError> {
        let _ = id;
        Err(GatewayError::Unsupported("atomic subtree delete"))
    }

    /// Persist a column
    fn insert_column(&mut self, column: &Column) -> Result<(), GatewayError>;

    /// Get a column by id
    fn find_column(&self, id: ColumnId) -> Result<Option<Column>, GatewayError>;

    /// Columns of a board, ordinal ascending
    fn find_columns(&self, board_id: BoardId) -> Result<Vec<Column>, GatewayError>;

    /// Apply the supplied patch fields
    fn update_column(&mut self, id: ColumnId, patch: &ColumnPatch) -> Result<Column, GatewayError>;

    /// Delete a single column row (no cascade)
    fn delete_column(&mut self, id: ColumnId) -> Result<(), GatewayError>;

    /// Decrement the ordinal of every column of `board_id` above `ordinal`
    ///
    /// Returns the number of columns shifted.
    fn close_ordinal_gap(&mut self, board_id: BoardId, ordinal: u32)
        -> Result<usize, GatewayError>;

    /// Persist a task
    fn insert_task(&mut self, task: &Task) -> Result<(), GatewayError>;

    /// Get a task by id
    fn find_task(&self, id: TaskId) -> Result<Option<Task>, GatewayError>;

    /// Tasks whose column is any of `column_ids`
    fn find_tasks(&self, column_ids: &[ColumnId]) -> Result<Vec<Task>, GatewayError>;

    /// Apply the supplied patch fields
    fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<Task, GatewayError>;

    /// Rewrite the column reference of a task
    fn set_task_column(&mut self, id: TaskId, column_id: ColumnId) -> Result<Task, GatewayError>;

    /// Delete a single task
    fn delete_task(&mut self, id: TaskId) -> Result<(), GatewayError>;

    /// Delete every task of a column, returning how many were removed
    fn delete_tasks_of_column(&mut self, column_id: ColumnId) -> Result<usize, GatewayError>;
}
