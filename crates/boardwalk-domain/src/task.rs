//! Task module - leaf work items

use crate::{ColumnId, TaskId};

/// A task inside a column
///
/// Tasks carry no ordering among their siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Deadline (Unix seconds)
    pub deadline: u64,

    /// Whether the task was announced to the calendar
    pub in_calendar: bool,

    /// Owning column
    pub column_id: ColumnId,
}

/// Partial update for a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New deadline (Unix seconds)
    pub deadline: Option<u64>,
}

impl TaskPatch {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deadline.is_none()
    }
}
