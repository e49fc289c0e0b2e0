//! Type conversions between wire and domain types
//!
//! Requests are parsed into engine inputs; domain entities are rendered
//! as JSON bodies with string ids and RFC 3339 timestamps.

use boardwalk_domain::{
    Board, BoardId, BoardPatch, BoardView, Column, ColumnId, ColumnPatch, ColumnView,
    Methodology, Task, TaskId, TaskPatch,
};
use boardwalk_engine::events::rfc3339;
use boardwalk_engine::{CreateBoardInput, CreateColumnInput, CreateTaskInput, MoveTaskInput};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Error type for conversion failures
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Identifier is not a UUID
    #[error("Invalid {kind} id: {value}")]
    InvalidId {
        /// Entity kind
        kind: &'static str,
        /// Rejected input
        value: String,
    },

    /// Methodology other than kanban or simple
    #[error("Unknown methodology: {0}")]
    InvalidMethodology(String),

    /// Deadline is not an RFC 3339 instant after the epoch
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    /// Progress outside 0..=100
    #[error("progress must be between 0 and 100, got {0}")]
    InvalidProgress(i64),
}

/// Parse a board id from a path segment or body field
pub fn parse_board_id(raw: &str) -> Result<BoardId, ConversionError> {
    BoardId::parse(raw.trim()).map_err(|_| invalid_id("board", raw))
}

/// Parse a column id
pub fn parse_column_id(raw: &str) -> Result<ColumnId, ConversionError> {
    ColumnId::parse(raw.trim()).map_err(|_| invalid_id("column", raw))
}

/// Parse a task id
pub fn parse_task_id(raw: &str) -> Result<TaskId, ConversionError> {
    TaskId::parse(raw.trim()).map_err(|_| invalid_id("task", raw))
}

fn invalid_id(kind: &'static str, raw: &str) -> ConversionError {
    ConversionError::InvalidId {
        kind,
        value: raw.to_string(),
    }
}

/// Parse an RFC 3339 deadline into Unix seconds
pub fn parse_deadline(raw: &str) -> Result<u64, ConversionError> {
    let instant = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| ConversionError::InvalidDeadline(format!("{}: {}", raw, e)))?;
    u64::try_from(instant.timestamp())
        .map_err(|_| ConversionError::InvalidDeadline(format!("{} is before 1970", raw)))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// POST /boards
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBoardRequest {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// "kanban" or "simple"
    pub methodology: String,
    /// Category label
    pub category: String,
}

impl CreateBoardRequest {
    /// Convert into the engine input
    pub fn into_input(self) -> Result<CreateBoardInput, ConversionError> {
        let methodology = Methodology::parse(self.methodology.trim())
            .ok_or_else(|| ConversionError::InvalidMethodology(self.methodology.clone()))?;
        Ok(CreateBoardInput {
            title: self.title,
            description: self.description,
            methodology,
            category: self.category,
        })
    }
}

/// PATCH /boards/:id
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateBoardRequest {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New progress
    #[serde(default)]
    pub progress: Option<i64>,
    /// New favorite flag
    #[serde(default)]
    pub favorite: Option<bool>,
}

impl UpdateBoardRequest {
    /// Convert into a board patch
    pub fn into_patch(self) -> Result<BoardPatch, ConversionError> {
        let progress = self
            .progress
            .map(|p| {
                u8::try_from(p)
                    .ok()
                    .filter(|v| *v <= 100)
                    .ok_or(ConversionError::InvalidProgress(p))
            })
            .transpose()?;
        Ok(BoardPatch {
            title: self.title,
            description: self.description,
            progress,
            favorite: self.favorite,
        })
    }
}

/// POST /boards/:id/columns
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateColumnRequest {
    /// Column name
    pub name: String,
}

impl CreateColumnRequest {
    /// Convert into the engine input for `board_id`
    pub fn into_input(self, board_id: BoardId) -> CreateColumnInput {
        CreateColumnInput {
            board_id,
            name: self.name,
        }
    }
}

/// PATCH /columns/:id
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateColumnRequest {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
}

impl From<UpdateColumnRequest> for ColumnPatch {
    fn from(request: UpdateColumnRequest) -> Self {
        ColumnPatch { name: request.name }
    }
}

/// POST /columns/:id/tasks
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Deadline, RFC 3339
    pub deadline: String,
    /// Announce to the calendar
    #[serde(default)]
    pub in_calendar: bool,
}

impl CreateTaskRequest {
    /// Convert into the engine input for `column_id`
    pub fn into_input(self, column_id: ColumnId) -> Result<CreateTaskInput, ConversionError> {
        Ok(CreateTaskInput {
            deadline: parse_deadline(&self.deadline)?,
            title: self.title,
            description: self.description,
            column_id,
            in_calendar: self.in_calendar,
        })
    }
}

/// PATCH /tasks/:id
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New deadline, RFC 3339
    #[serde(default)]
    pub deadline: Option<String>,
}

impl UpdateTaskRequest {
    /// Convert into a task patch
    pub fn into_patch(self) -> Result<TaskPatch, ConversionError> {
        Ok(TaskPatch {
            title: self.title,
            description: self.description,
            deadline: self.deadline.as_deref().map(parse_deadline).transpose()?,
        })
    }
}

/// POST /tasks/:id/move
#[derive(Debug, Serialize, Deserialize)]
pub struct MoveTaskRequest {
    /// Destination column
    pub column_id: String,
}

impl MoveTaskRequest {
    /// Convert into the engine input for `task_id`
    pub fn into_input(self, task_id: TaskId) -> Result<MoveTaskInput, ConversionError> {
        Ok(MoveTaskInput {
            task_id,
            column_id: parse_column_id(&self.column_id)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Board summary
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub methodology: String,
    pub progress: u8,
    pub favorite: bool,
    pub column_count: u32,
    pub created_at: String,
    pub updated_at: String,
    pub owner_id: String,
}

impl From<Board> for BoardResponse {
    fn from(board: Board) -> Self {
        BoardResponse {
            id: board.id.to_string(),
            title: board.title,
            description: board.description,
            category: board.category,
            methodology: board.methodology.as_str().to_string(),
            progress: board.progress,
            favorite: board.favorite,
            column_count: board.column_count,
            created_at: rfc3339(board.created_at),
            updated_at: rfc3339(board.updated_at),
            owner_id: board.owner_id,
        }
    }
}

/// Column without tasks
#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnResponse {
    pub id: String,
    pub name: String,
    pub ordinal: u32,
    pub board_id: String,
}

impl From<Column> for ColumnResponse {
    fn from(column: Column) -> Self {
        ColumnResponse {
            id: column.id.to_string(),
            name: column.name,
            ordinal: column.ordinal,
            board_id: column.board_id.to_string(),
        }
    }
}

/// Task
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub in_calendar: bool,
    pub column_id: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        TaskResponse {
            id: task.id.to_string(),
            title: task.title,
            description: task.description,
            deadline: rfc3339(task.deadline),
            in_calendar: task.in_calendar,
            column_id: task.column_id.to_string(),
        }
    }
}

/// Column with its tasks, inside a board view
#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnViewResponse {
    #[serde(flatten)]
    pub column: ColumnResponse,
    pub tasks: Vec<TaskResponse>,
}

impl From<ColumnView> for ColumnViewResponse {
    fn from(view: ColumnView) -> Self {
        ColumnViewResponse {
            column: view.column.into(),
            tasks: view.tasks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Board with nested columns and tasks
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardViewResponse {
    #[serde(flatten)]
    pub board: BoardResponse,
    pub columns: Vec<ColumnViewResponse>,
}

impl From<BoardView> for BoardViewResponse {
    fn from(view: BoardView) -> Self {
        BoardViewResponse {
            board: view.board.into(),
            columns: view.columns.into_iter().map(Into::into).collect(),
        }
    }
}
