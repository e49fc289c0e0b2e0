//! Column module

use crate::{BoardId, ColumnId};

/// A column on a board
///
/// Ordinals are 1-based and dense: the columns of a board always occupy
/// exactly `1..=column_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Unique identifier
    pub id: ColumnId,

    /// Display name, unique per board (case-insensitive)
    pub name: String,

    /// 1-based position among the board's columns
    pub ordinal: u32,

    /// Owning board
    pub board_id: BoardId,
}

/// Partial update for a column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPatch {
    /// New name
    pub name: Option<String>,
}

impl ColumnPatch {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
