//! Aggregation of the flat collections into a nested board view

use crate::error::{EngineError, EngineResult};
use boardwalk_domain::{BoardId, BoardView, ColumnId, ColumnView, HierarchyStore, Task};
use std::collections::HashMap;

/// Assemble a board with its ordered columns and their tasks
///
/// A missing board is `BoardNotFound`; a board without columns or tasks
/// simply yields empty lists.
pub fn build_board_view<S>(store: &S, board_id: BoardId) -> EngineResult<BoardView>
where
    S: HierarchyStore + ?Sized,
{
    let board = store
        .find_board(board_id)?
        .ok_or(EngineError::BoardNotFound(board_id))?;

    let mut columns = store.find_columns(board_id)?;
    columns.sort_by_key(|c| c.ordinal);

    let column_ids: Vec<ColumnId> = columns.iter().map(|c| c.id).collect();
    let mut by_column: HashMap<ColumnId, Vec<Task>> = HashMap::new();
    for task in store.find_tasks(&column_ids)? {
        by_column.entry(task.column_id).or_default().push(task);
    }

    let columns = columns
        .into_iter()
        .map(|column| ColumnView {
            tasks: by_column.remove(&column.id).unwrap_or_default(),
            column,
        })
        .collect();

    Ok(BoardView { board, columns })
}
