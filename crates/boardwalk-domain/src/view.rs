//! Read models assembled from the flat collections

use crate::{Board, Column, Task};

/// A board with its columns (ordinal ascending) and their tasks
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    /// The board itself
    pub board: Board,
    /// Columns ordered by ordinal
    pub columns: Vec<ColumnView>,
}

/// A column with the tasks that reference it
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    /// The column itself
    pub column: Column,
    /// Tasks in this column
    pub tasks: Vec<Task>,
}

impl BoardView {
    /// Total number of tasks across all columns
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

/// What a subtree deletion removed below the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeRemoval {
    /// Columns removed
    pub columns: usize,
    /// Tasks removed
    pub tasks: usize,
}
