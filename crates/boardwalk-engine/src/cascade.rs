//! Subtree deletion for boards
//!
//! Stores with transactions delete the whole subtree atomically through
//! [`HierarchyStore::delete_board_tree`]. For stores without them the
//! engine snapshots the subtree, deletes it step by step, and on failure
//! re-inserts whatever was already removed. Only a failure of that
//! restore leaves the subtree partially removed, and it is reported as
//! [`EngineError::PartiallyApplied`].

use crate::error::{EngineError, EngineResult};
use boardwalk_domain::{
    Board, Column, ColumnId, GatewayError, HierarchyStore, SubtreeRemoval, Task,
};
use std::collections::HashMap;

const OPERATION: &str = "delete_board";

/// Delete `board` and everything below it as one logical unit
pub(crate) fn delete_board_subtree<S>(store: &mut S, board: &Board) -> EngineResult<SubtreeRemoval>
where
    S: HierarchyStore + ?Sized,
{
    match store.delete_board_tree(board.id) {
        Ok(removal) => Ok(removal),
        Err(GatewayError::Unsupported(_)) => delete_with_compensation(store, board),
        Err(e) => Err(EngineError::or_missing(e, EngineError::BoardNotFound(board.id))),
    }
}

/// What the forward pass has removed so far
#[derive(Default)]
struct Removed {
    columns: Vec<Column>,
    tasks: Vec<Task>,
}

fn delete_with_compensation<S>(store: &mut S, board: &Board) -> EngineResult<SubtreeRemoval>
where
    S: HierarchyStore + ?Sized,
{
    let columns = store.find_columns(board.id)?;
    let column_ids: Vec<ColumnId> = columns.iter().map(|c| c.id).collect();
    let mut tasks: HashMap<ColumnId, Vec<Task>> = HashMap::new();
    for task in store.find_tasks(&column_ids)? {
        tasks.entry(task.column_id).or_default().push(task);
    }

    let mut removed = Removed::default();
    let cause = match forward(store, board, &columns, &mut tasks, &mut removed) {
        Ok(()) => {
            return Ok(SubtreeRemoval {
                columns: removed.columns.len(),
                tasks: removed.tasks.len(),
            })
        }
        Err(cause) => cause,
    };

    tracing::warn!(
        board = %board.id,
        error = %cause,
        columns = removed.columns.len(),
        tasks = removed.tasks.len(),
        "board cascade failed, restoring removed entities"
    );

    match restore(store, &removed) {
        Ok(()) => Err(EngineError::or_missing(
            cause,
            EngineError::BoardNotFound(board.id),
        )),
        Err(restore_error) => {
            tracing::error!(
                board = %board.id,
                error = %restore_error,
                "failed to restore board subtree after cascade failure"
            );
            Err(EngineError::PartiallyApplied {
                operation: OPERATION,
                step: "restore after failed cascade",
                source: cause,
            })
        }
    }
}

fn forward<S>(
    store: &mut S,
    board: &Board,
    columns: &[Column],
    tasks: &mut HashMap<ColumnId, Vec<Task>>,
    removed: &mut Removed,
) -> Result<(), GatewayError>
where
    S: HierarchyStore + ?Sized,
{
    for column in columns {
        store.delete_tasks_of_column(column.id)?;
        removed
            .tasks
            .extend(tasks.remove(&column.id).unwrap_or_default());
    }
    for column in columns {
        store.delete_column(column.id)?;
        removed.columns.push(column.clone());
    }
    store.delete_board(board.id)
}

/// Re-insert columns first so their tasks have a parent again
fn restore<S>(store: &mut S, removed: &Removed) -> Result<(), GatewayError>
where
    S: HierarchyStore + ?Sized,
{
    for column in &removed.columns {
        store.insert_column(column)?;
    }
    for task in &removed.tasks {
        store.insert_task(task)?;
    }
    Ok(())
}
