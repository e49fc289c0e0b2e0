//! Column operations
//!
//! Ordinals of a board's columns always form the dense sequence
//! `1..=column_count`. Creation appends at the end using the store's
//! atomic counter; deletion closes the gap it leaves.

use crate::engine::BoardEngine;
use crate::error::{EngineError, EngineResult};
use crate::input::CreateColumnInput;
use crate::validate;
use boardwalk_domain::{
    BoardId, Column, ColumnId, ColumnPatch, GatewayError, HierarchyStore, SubtreeRemoval,
};

/// Fail with `AlreadyExists` if a sibling (other than `except`) has `name`
fn ensure_unique_name<S>(
    store: &S,
    board_id: BoardId,
    name: &str,
    except: Option<ColumnId>,
) -> EngineResult<()>
where
    S: HierarchyStore + ?Sized,
{
    let taken = store
        .find_columns(board_id)?
        .iter()
        .any(|c| Some(c.id) != except && validate::same_name(&c.name, name));
    if taken {
        return Err(EngineError::AlreadyExists(format!(
            "column named '{}' already exists",
            name
        )));
    }
    Ok(())
}

impl<S> BoardEngine<S>
where
    S: HierarchyStore + Send + 'static,
{
    /// Append a column to a board
    ///
    /// The ordinal comes from incrementing the board counter. If the
    /// insert then fails the counter is decremented again; a failure of
    /// that compensation is reported as [`EngineError::PartiallyApplied`].
    pub async fn create_column(&self, input: CreateColumnInput) -> EngineResult<Column> {
        let name = validate::required("name", &input.name)?;
        let board_id = input.board_id;

        self.unit("create_column", move |store| {
            if store.find_board(board_id)?.is_none() {
                return Err(EngineError::BoardNotFound(board_id));
            }
            ensure_unique_name(&*store, board_id, &name, None)?;

            let ordinal = store
                .increment_column_count(board_id)
                .map_err(|e| EngineError::or_missing(e, EngineError::BoardNotFound(board_id)))?;

            let column = Column {
                id: ColumnId::new(),
                name,
                ordinal,
                board_id,
            };

            if let Err(cause) = store.insert_column(&column) {
                if let Err(e) = store.decrement_column_count(board_id) {
                    tracing::error!(
                        board = %board_id,
                        insert_error = %cause,
                        error = %e,
                        "failed to roll back column counter after insert failure"
                    );
                    return Err(EngineError::PartiallyApplied {
                        operation: "create_column",
                        step: "compensate column count",
                        source: e,
                    });
                }
                return Err(cause.into());
            }

            tracing::info!(
                board = %board_id,
                column = %column.id,
                ordinal = column.ordinal,
                "column created"
            );
            Ok(column)
        })
        .await
    }

    /// Columns of a board, ordinal ascending
    pub async fn list_columns(&self, board_id: BoardId) -> EngineResult<Vec<Column>> {
        self.unit("list_columns", move |store| {
            if store.find_board(board_id)?.is_none() {
                return Err(EngineError::BoardNotFound(board_id));
            }
            let mut columns = store.find_columns(board_id)?;
            columns.sort_by_key(|c| c.ordinal);
            Ok(columns)
        })
        .await
    }

    /// Rename a column
    ///
    /// An empty patch returns the column unchanged.
    pub async fn update_column(
        &self,
        column_id: ColumnId,
        patch: ColumnPatch,
    ) -> EngineResult<Column> {
        let patch = ColumnPatch {
            name: validate::optional("name", &patch.name)?,
        };

        self.unit("update_column", move |store| {
            let column = store
                .find_column(column_id)?
                .ok_or(EngineError::ColumnNotFound(column_id))?;
            if patch.is_empty() {
                return Ok(column);
            }
            if let Some(name) = &patch.name {
                ensure_unique_name(&*store, column.board_id, name, Some(column_id))?;
            }

            let updated = store
                .update_column(column_id, &patch)
                .map_err(|e| EngineError::or_missing(e, EngineError::ColumnNotFound(column_id)))?;
            tracing::info!(column = %column_id, "column updated");
            Ok(updated)
        })
        .await
    }

    /// Delete a column and its tasks, then renumber its siblings
    ///
    /// Steps after the column row is gone are carried forward on a best
    /// effort basis: each is attempted, and the first failure is reported
    /// as [`EngineError::PartiallyApplied`].
    pub async fn delete_column(&self, column_id: ColumnId) -> EngineResult<SubtreeRemoval> {
        self.unit("delete_column", move |store| {
            let column = store
                .find_column(column_id)?
                .ok_or(EngineError::ColumnNotFound(column_id))?;

            let tasks = store
                .delete_tasks_of_column(column_id)
                .map_err(|e| EngineError::or_missing(e, EngineError::ColumnNotFound(column_id)))?;

            if let Err(e) = store.delete_column(column_id) {
                if tasks == 0 {
                    return Err(EngineError::or_missing(e, EngineError::ColumnNotFound(column_id)));
                }
                return Err(EngineError::PartiallyApplied {
                    operation: "delete_column",
                    step: "delete column",
                    source: e,
                });
            }

            let mut failure: Option<(&'static str, GatewayError)> = None;
            if let Err(e) = store.close_ordinal_gap(column.board_id, column.ordinal) {
                failure = Some(("close ordinal gap", e));
            }
            if let Err(e) = store.decrement_column_count(column.board_id) {
                failure = failure.or(Some(("decrement column count", e)));
            }

            if let Some((step, source)) = failure {
                tracing::error!(
                    column = %column_id,
                    board = %column.board_id,
                    step,
                    error = %source,
                    "column deleted but board left inconsistent"
                );
                return Err(EngineError::PartiallyApplied {
                    operation: "delete_column",
                    step,
                    source,
                });
            }

            tracing::info!(
                column = %column_id,
                board = %column.board_id,
                tasks,
                "column deleted"
            );
            Ok(SubtreeRemoval { columns: 1, tasks })
        })
        .await
    }
}
