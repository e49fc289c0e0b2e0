//! Input structures for engine operations
//!
//! The transport layer parses wire requests into these.

use boardwalk_domain::{BoardId, ColumnId, Methodology, TaskId};

/// Create a board
#[derive(Debug, Clone)]
pub struct CreateBoardInput {
    /// Title, unique per owner
    pub title: String,
    /// Description
    pub description: String,
    /// Template kind
    pub methodology: Methodology,
    /// Category label
    pub category: String,
}

/// Append a column to a board
#[derive(Debug, Clone)]
pub struct CreateColumnInput {
    /// Parent board
    pub board_id: BoardId,
    /// Column name, unique per board
    pub name: String,
}

/// Create a task in a column
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Deadline (Unix seconds), must be in the future
    pub deadline: u64,
    /// Parent column
    pub column_id: ColumnId,
    /// Announce the task to the calendar
    pub in_calendar: bool,
}

/// Move a task to another column
#[derive(Debug, Clone, Copy)]
pub struct MoveTaskInput {
    /// Task to move
    pub task_id: TaskId,
    /// Destination column
    pub column_id: ColumnId,
}
