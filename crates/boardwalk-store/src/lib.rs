//! Boardwalk Storage Layer
//!
//! Implements the [`HierarchyStore`] gateway over SQLite.
//!
//! # Architecture
//!
//! - Three tables (`boards`, `board_columns`, `tasks`) linked by reference
//! - Unique indexes on `(owner_id, title)` and `(board_id, name)`, both
//!   `COLLATE NOCASE`, so a concurrent duplicate is rejected by the store
//!   even when it slips past the engine's pre-check
//! - Column counters are updated with single `UPDATE … RETURNING`
//!   statements, which makes ordinal assignment race-free
//! - Subtree deletion runs inside one transaction
//!
//! # Examples
//!
//! ```no_run
//! use boardwalk_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for board operations
//! ```

#![warn(missing_docs)]

use boardwalk_domain::{
    Board, BoardId, BoardPatch, Column, ColumnId, ColumnPatch, GatewayError, HierarchyStore,
    Methodology, SubtreeRemoval, Task, TaskId, TaskPatch,
};
use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match &e {
            StoreError::Database(rusqlite::Error::SqliteFailure(failure, msg))
                if failure.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                GatewayError::Conflict(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => GatewayError::Backend(e.to_string()),
        }
    }
}

fn db(e: rusqlite::Error) -> GatewayError {
    StoreError::from(e).into()
}

/// Timestamps are stored as INTEGER, which SQLite keeps signed
fn signed_secs(field: &str, secs: u64) -> Result<i64, GatewayError> {
    i64::try_from(secs).map_err(|_| {
        StoreError::InvalidData(format!("{} {} does not fit a signed timestamp", field, secs))
            .into()
    })
}

const BOARD_COLUMNS: &str = "id, title, description, category, methodology, progress, favorite, \
                             column_count, created_at, updated_at, owner_id";
const COLUMN_COLUMNS: &str = "id, name, ordinal, board_id";
const TASK_COLUMNS: &str = "id, title, description, deadline, in_calendar, column_id";

/// SQLite-based implementation of [`HierarchyStore`]
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks by
/// wrapping it in a mutex.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

fn id_to_bytes(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn bytes_to_value(bytes: &[u8]) -> Result<u128, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for id, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(arr))
}

fn conversion_failure(index: usize, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Blob, Box::new(e))
}

fn id_at(row: &Row<'_>, index: usize) -> rusqlite::Result<u128> {
    let bytes: Vec<u8> = row.get(index)?;
    bytes_to_value(&bytes).map_err(|e| conversion_failure(index, e))
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    let methodology: String = row.get(4)?;
    let methodology = Methodology::parse(&methodology).ok_or_else(|| {
        conversion_failure(
            4,
            StoreError::InvalidData(format!("Unknown methodology: {}", methodology)),
        )
    })?;

    Ok(Board {
        id: BoardId::from_value(id_at(row, 0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        methodology,
        progress: row.get(5)?,
        favorite: row.get(6)?,
        column_count: row.get(7)?,
        created_at: row.get::<_, i64>(8)? as u64,
        updated_at: row.get::<_, i64>(9)? as u64,
        owner_id: row.get(10)?,
    })
}

fn column_from_row(row: &Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: ColumnId::from_value(id_at(row, 0)?),
        name: row.get(1)?,
        ordinal: row.get(2)?,
        board_id: BoardId::from_value(id_at(row, 3)?),
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::from_value(id_at(row, 0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        deadline: row.get::<_, i64>(3)? as u64,
        in_calendar: row.get(4)?,
        column_id: ColumnId::from_value(id_at(row, 5)?),
    })
}

fn insert_column_row(conn: &Connection, column: &Column) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO board_columns (id, name, ordinal, board_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            id_to_bytes(column.id.value()),
            &column.name,
            column.ordinal,
            id_to_bytes(column.board_id.value()),
        ],
    )
}

impl HierarchyStore for SqliteStore {
    fn insert_board(&mut self, board: &Board, columns: &[Column]) -> Result<(), GatewayError> {
        let tx = self.conn.transaction().map_err(db)?;

        tx.execute(
            "INSERT INTO boards (id, title, description, category, methodology, progress, favorite,
                                 column_count, created_at, updated_at, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id_to_bytes(board.id.value()),
                &board.title,
                &board.description,
                &board.category,
                board.methodology.as_str(),
                board.progress,
                board.favorite,
                board.column_count,
                board.created_at as i64,
                board.updated_at as i64,
                &board.owner_id,
            ],
        )
        .map_err(db)?;

        for column in columns {
            insert_column_row(&tx, column).map_err(db)?;
        }

        tx.commit().map_err(db)
    }

    fn find_board(&self, id: BoardId) -> Result<Option<Board>, GatewayError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM boards WHERE id = ?1", BOARD_COLUMNS),
                params![id_to_bytes(id.value())],
                board_from_row,
            )
            .optional()
            .map_err(db)
    }

    fn find_boards(&self, owner_id: Option<&str>) -> Result<Vec<Board>, GatewayError> {
        let mut sql = format!("SELECT {} FROM boards", BOARD_COLUMNS);
        let mut values: Vec<&dyn ToSql> = Vec::new();
        if let Some(owner) = &owner_id {
            sql.push_str(" WHERE owner_id = ?");
            values.push(owner);
        }
        sql.push_str(" ORDER BY created_at, id");

        let mut stmt = self.conn.prepare(&sql).map_err(db)?;
        let boards = stmt
            .query_map(&values[..], board_from_row)
            .map_err(db)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db)?;
        Ok(boards)
    }

    fn update_board(
        &mut self,
        id: BoardId,
        patch: &BoardPatch,
        updated_at: u64,
    ) -> Result<Board, GatewayError> {
        let mut sets = vec!["updated_at = ?"];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(updated_at as i64)];

        if let Some(title) = &patch.title {
            sets.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(progress) = patch.progress {
            sets.push("progress = ?");
            values.push(Box::new(progress));
        }
        if let Some(favorite) = patch.favorite {
            sets.push("favorite = ?");
            values.push(Box::new(favorite));
        }
        values.push(Box::new(id_to_bytes(id.value())));

        let sql = format!("UPDATE boards SET {} WHERE id = ?", sets.join(", "));
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let changed = self.conn.execute(&sql, &refs[..]).map_err(db)?;
        if changed == 0 {
            return Err(GatewayError::not_found("board", id));
        }

        self.find_board(id)?
            .ok_or_else(|| GatewayError::not_found("board", id))
    }

    fn delete_board(&mut self, id: BoardId) -> Result<(), GatewayError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM boards WHERE id = ?1",
                params![id_to_bytes(id.value())],
            )
            .map_err(db)?;
        if removed == 0 {
            return Err(GatewayError::not_found("board", id));
        }
        Ok(())
    }

    fn increment_column_count(&mut self, id: BoardId) -> Result<u32, GatewayError> {
        self.conn
            .query_row(
                "UPDATE boards SET column_count = column_count + 1 WHERE id = ?1
                 RETURNING column_count",
                params![id_to_bytes(id.value())],
                |row| row.get(0),
            )
            .optional()
            .map_err(db)?
            .ok_or_else(|| GatewayError::not_found("board", id))
    }

    fn decrement_column_count(&mut self, id: BoardId) -> Result<u32, GatewayError> {
        self.conn
            .query_row(
                "UPDATE boards SET column_count = MAX(column_count - 1, 0) WHERE id = ?1
                 RETURNING column_count",
                params![id_to_bytes(id.value())],
                |row| row.get(0),
            )
            .optional()
            .map_err(db)?
            .ok_or_else(|| GatewayError::not_found("board", id))
    }

    fn delete_board_tree(&mut self, id: BoardId) -> Result<SubtreeRemoval, GatewayError> {
        let key = id_to_bytes(id.value());
        // Dropping the transaction without commit rolls everything back.
        let tx = self.conn.transaction().map_err(db)?;

        let tasks = tx
            .execute(
                "DELETE FROM tasks WHERE column_id IN
                     (SELECT id FROM board_columns WHERE board_id = ?1)",
                params![&key],
            )
            .map_err(db)?;
        let columns = tx
            .execute("DELETE FROM board_columns WHERE board_id = ?1", params![&key])
            .map_err(db)?;
        let boards = tx
            .execute("DELETE FROM boards WHERE id = ?1", params![&key])
            .map_err(db)?;
        if boards == 0 {
            return Err(GatewayError::not_found("board", id));
        }

        tx.commit().map_err(db)?;
        Ok(SubtreeRemoval { columns, tasks })
    }

    fn insert_column(&mut self, column: &Column) -> Result<(), GatewayError> {
        insert_column_row(&self.conn, column).map_err(db)?;
        Ok(())
    }

    fn find_column(&self, id: ColumnId) -> Result<Option<Column>, GatewayError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM board_columns WHERE id = ?1", COLUMN_COLUMNS),
                params![id_to_bytes(id.value())],
                column_from_row,
            )
            .optional()
            .map_err(db)
    }

    fn find_columns(&self, board_id: BoardId) -> Result<Vec<Column>, GatewayError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM board_columns WHERE board_id = ?1 ORDER BY ordinal, id",
                COLUMN_COLUMNS
            ))
            .map_err(db)?;
        let columns = stmt
            .query_map(params![id_to_bytes(board_id.value())], column_from_row)
            .map_err(db)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db)?;
        Ok(columns)
    }

    fn update_column(&mut self, id: ColumnId, patch: &ColumnPatch) -> Result<Column, GatewayError> {
        if let Some(name) = &patch.name {
            let changed = self
                .conn
                .execute(
                    "UPDATE board_columns SET name = ?1 WHERE id = ?2",
                    params![name, id_to_bytes(id.value())],
                )
                .map_err(db)?;
            if changed == 0 {
                return Err(GatewayError::not_found("column", id));
            }
        }

        self.find_column(id)?
            .ok_or_else(|| GatewayError::not_found("column", id))
    }

    fn delete_column(&mut self, id: ColumnId) -> Result<(), GatewayError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM board_columns WHERE id = ?1",
                params![id_to_bytes(id.value())],
            )
            .map_err(db)?;
        if removed == 0 {
            return Err(GatewayError::not_found("column", id));
        }
        Ok(())
    }

    fn close_ordinal_gap(
        &mut self,
        board_id: BoardId,
        ordinal: u32,
    ) -> Result<usize, GatewayError> {
        self.conn
            .execute(
                "UPDATE board_columns SET ordinal = ordinal - 1
                 WHERE board_id = ?1 AND ordinal > ?2",
                params![id_to_bytes(board_id.value()), ordinal],
            )
            .map_err(db)
    }

    fn insert_task(&mut self, task: &Task) -> Result<(), GatewayError> {
        let deadline = signed_secs("deadline", task.deadline)?;
        self.conn
            .execute(
                "INSERT INTO tasks (id, title, description, deadline, in_calendar, column_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id_to_bytes(task.id.value()),
                    &task.title,
                    &task.description,
                    deadline,
                    task.in_calendar,
                    id_to_bytes(task.column_id.value()),
                ],
            )
            .map_err(db)?;
        Ok(())
    }

    fn find_task(&self, id: TaskId) -> Result<Option<Task>, GatewayError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id_to_bytes(id.value())],
                task_from_row,
            )
            .optional()
            .map_err(db)
    }

    fn find_tasks(&self, column_ids: &[ColumnId]) -> Result<Vec<Task>, GatewayError> {
        if column_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; column_ids.len()].join(", ");
        let keys: Vec<Vec<u8>> = column_ids.iter().map(|c| id_to_bytes(c.value())).collect();

        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM tasks WHERE column_id IN ({}) ORDER BY id",
                TASK_COLUMNS, placeholders
            ))
            .map_err(db)?;
        let tasks = stmt
            .query_map(params_from_iter(keys.iter()), task_from_row)
            .map_err(db)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db)?;
        Ok(tasks)
    }

    fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<Task, GatewayError> {
        let mut sets = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(title) = &patch.title {
            sets.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(deadline) = patch.deadline {
            sets.push("deadline = ?");
            values.push(Box::new(signed_secs("deadline", deadline)?));
        }

        if !sets.is_empty() {
            values.push(Box::new(id_to_bytes(id.value())));
            let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
            let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            let changed = self.conn.execute(&sql, &refs[..]).map_err(db)?;
            if changed == 0 {
                return Err(GatewayError::not_found("task", id));
            }
        }

        self.find_task(id)?
            .ok_or_else(|| GatewayError::not_found("task", id))
    }

    fn set_task_column(&mut self, id: TaskId, column_id: ColumnId) -> Result<Task, GatewayError> {
        let changed = self
            .conn
            .execute(
                "UPDATE tasks SET column_id = ?1 WHERE id = ?2",
                params![id_to_bytes(column_id.value()), id_to_bytes(id.value())],
            )
            .map_err(db)?;
        if changed == 0 {
            return Err(GatewayError::not_found("task", id));
        }

        self.find_task(id)?
            .ok_or_else(|| GatewayError::not_found("task", id))
    }

    fn delete_task(&mut self, id: TaskId) -> Result<(), GatewayError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM tasks WHERE id = ?1",
                params![id_to_bytes(id.value())],
            )
            .map_err(db)?;
        if removed == 0 {
            return Err(GatewayError::not_found("task", id));
        }
        Ok(())
    }

    fn delete_tasks_of_column(&mut self, column_id: ColumnId) -> Result<usize, GatewayError> {
        self.conn
            .execute(
                "DELETE FROM tasks WHERE column_id = ?1",
                params![id_to_bytes(column_id.value())],
            )
            .map_err(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(owner: &str, title: &str) -> Board {
        Board {
            id: BoardId::new(),
            title: title.to_string(),
            description: "desc".to_string(),
            category: "work".to_string(),
            methodology: Methodology::Kanban,
            progress: 0,
            favorite: false,
            column_count: 1,
            created_at: 1000,
            updated_at: 1000,
            owner_id: owner.to_string(),
        }
    }

    fn column(board_id: BoardId, name: &str, ordinal: u32) -> Column {
        Column {
            id: ColumnId::new(),
            name: name.to_string(),
            ordinal,
            board_id,
        }
    }

    fn task(column_id: ColumnId) -> Task {
        Task {
            id: TaskId::new(),
            title: "t".to_string(),
            description: "d".to_string(),
            deadline: 5000,
            in_calendar: false,
            column_id,
        }
    }

    #[test]
    fn test_subtree_delete_rolls_back_on_failure() {
        let mut store = SqliteStore::in_memory().unwrap();
        let b = board("alice", "Sprint");
        let c = column(b.id, "Todo", 1);
        store.insert_board(&b, &[c.clone()]).unwrap();
        let t = task(c.id);
        store.insert_task(&t).unwrap();

        // Make the final step of the cascade fail
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER block_board_delete BEFORE DELETE ON boards
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
            )
            .unwrap();

        let result = store.delete_board_tree(b.id);
        assert!(matches!(result, Err(GatewayError::Backend(_))));

        // Nothing was removed
        assert!(store.find_board(b.id).unwrap().is_some());
        assert_eq!(store.find_columns(b.id).unwrap(), vec![c.clone()]);
        assert_eq!(store.find_tasks(&[c.id]).unwrap(), vec![t]);
    }

    #[test]
    fn test_insert_board_is_atomic_with_columns() {
        let mut store = SqliteStore::in_memory().unwrap();
        let b = board("alice", "Sprint");
        // Duplicate names violate the per-board unique index
        let columns = vec![column(b.id, "Todo", 1), column(b.id, "TODO", 2)];

        let result = store.insert_board(&b, &columns);
        assert!(matches!(result, Err(GatewayError::Conflict(_))));
        assert!(store.find_board(b.id).unwrap().is_none());
    }

    #[test]
    fn test_bytes_to_value_rejects_short_blob() {
        assert!(matches!(
            bytes_to_value(&[1, 2, 3]),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_column_delete_refused_while_tasks_reference_it() {
        let mut store = SqliteStore::in_memory().unwrap();
        let b = board("alice", "Sprint");
        let c = column(b.id, "Todo", 1);
        store.insert_board(&b, &[c.clone()]).unwrap();
        store.insert_task(&task(c.id)).unwrap();

        // Foreign keys keep tasks from being orphaned
        assert!(store.delete_column(c.id).is_err());
        assert_eq!(store.delete_tasks_of_column(c.id).unwrap(), 1);
        assert!(store.delete_column(c.id).is_ok());
    }
}
