//! Integration tests for boardwalk-store
//!
//! These tests exercise the gateway contract: CRUD per collection, the
//! atomic counters, ordinal renumbering and subtree deletion.

use boardwalk_domain::{
    Board, BoardId, BoardPatch, Column, ColumnId, ColumnPatch, GatewayError, HierarchyStore,
    Methodology, Task, TaskId, TaskPatch,
};
use boardwalk_store::SqliteStore;

fn new_board(owner: &str, title: &str, column_count: u32) -> Board {
    Board {
        id: BoardId::new(),
        title: title.to_string(),
        description: "A board".to_string(),
        category: "work".to_string(),
        methodology: Methodology::Kanban,
        progress: 0,
        favorite: false,
        column_count,
        created_at: 1_700_000_000,
        updated_at: 1_700_000_000,
        owner_id: owner.to_string(),
    }
}

fn new_column(board_id: BoardId, name: &str, ordinal: u32) -> Column {
    Column {
        id: ColumnId::new(),
        name: name.to_string(),
        ordinal,
        board_id,
    }
}

fn new_task(column_id: ColumnId, title: &str) -> Task {
    Task {
        id: TaskId::new(),
        title: title.to_string(),
        description: "Something to do".to_string(),
        deadline: 1_900_000_000,
        in_calendar: false,
        column_id,
    }
}

/// Board with three columns, returned with its columns in ordinal order
fn seeded(store: &mut SqliteStore) -> (Board, Vec<Column>) {
    let board = new_board("alice", "Sprint 1", 3);
    let columns = vec![
        new_column(board.id, "To Do", 1),
        new_column(board.id, "In Progress", 2),
        new_column(board.id, "Done", 3),
    ];
    store.insert_board(&board, &columns).unwrap();
    (board, columns)
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_insert_and_find_board() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (board, columns) = seeded(&mut store);

    let found = store.find_board(board.id).unwrap();
    assert_eq!(found, Some(board.clone()));

    let found_columns = store.find_columns(board.id).unwrap();
    assert_eq!(found_columns, columns);
}

#[test]
fn test_find_missing_board_is_none() {
    let store = SqliteStore::in_memory().unwrap();
    assert!(store.find_board(BoardId::new()).unwrap().is_none());
}

#[test]
fn test_find_boards_filters_by_owner() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.insert_board(&new_board("alice", "A", 0), &[]).unwrap();
    store.insert_board(&new_board("alice", "B", 0), &[]).unwrap();
    store.insert_board(&new_board("bob", "C", 0), &[]).unwrap();

    assert_eq!(store.find_boards(Some("alice")).unwrap().len(), 2);
    assert_eq!(store.find_boards(Some("bob")).unwrap().len(), 1);
    assert_eq!(store.find_boards(Some("carol")).unwrap().len(), 0);
    assert_eq!(store.find_boards(None).unwrap().len(), 3);
}

#[test]
fn test_board_title_unique_per_owner_case_insensitive() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.insert_board(&new_board("alice", "Roadmap", 0), &[]).unwrap();

    let result = store.insert_board(&new_board("alice", "ROADMAP", 0), &[]);
    assert!(matches!(result, Err(GatewayError::Conflict(_))));

    // Other owners may reuse the title
    assert!(store.insert_board(&new_board("bob", "Roadmap", 0), &[]).is_ok());
}

#[test]
fn test_update_board_touches_only_supplied_fields() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (board, _) = seeded(&mut store);

    let patch = BoardPatch {
        progress: Some(40),
        favorite: Some(true),
        ..Default::default()
    };
    let updated = store.update_board(board.id, &patch, 1_800_000_000).unwrap();

    assert_eq!(updated.progress, 40);
    assert!(updated.favorite);
    assert_eq!(updated.title, board.title);
    assert_eq!(updated.description, board.description);
    assert_eq!(updated.created_at, board.created_at);
    assert_eq!(updated.updated_at, 1_800_000_000);
}

#[test]
fn test_update_missing_board_is_not_found() {
    let mut store = SqliteStore::in_memory().unwrap();
    let result = store.update_board(BoardId::new(), &BoardPatch::default(), 1);
    assert!(matches!(result, Err(GatewayError::NotFound { entity: "board", .. })));
}

#[test]
fn test_increment_returns_post_increment_value() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (board, _) = seeded(&mut store);

    assert_eq!(store.increment_column_count(board.id).unwrap(), 4);
    assert_eq!(store.increment_column_count(board.id).unwrap(), 5);
    assert_eq!(store.decrement_column_count(board.id).unwrap(), 4);

    let stored = store.find_board(board.id).unwrap().unwrap();
    assert_eq!(stored.column_count, 4);
}

#[test]
fn test_decrement_never_goes_negative() {
    let mut store = SqliteStore::in_memory().unwrap();
    let board = new_board("alice", "Empty", 0);
    store.insert_board(&board, &[]).unwrap();

    assert_eq!(store.decrement_column_count(board.id).unwrap(), 0);
}

#[test]
fn test_counter_on_missing_board_is_not_found() {
    let mut store = SqliteStore::in_memory().unwrap();
    let missing = BoardId::new();

    assert!(store.increment_column_count(missing).unwrap_err().is_not_found());
    assert!(store.decrement_column_count(missing).unwrap_err().is_not_found());
}

#[test]
fn test_column_name_unique_per_board() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (board, _) = seeded(&mut store);
    let other = new_board("alice", "Sprint 2", 0);
    store.insert_board(&other, &[]).unwrap();

    let dup = new_column(board.id, "done", 4);
    assert!(matches!(
        store.insert_column(&dup),
        Err(GatewayError::Conflict(_))
    ));

    // Same name on another board is fine
    assert!(store.insert_column(&new_column(other.id, "Done", 1)).is_ok());
}

#[test]
fn test_close_ordinal_gap() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (board, columns) = seeded(&mut store);

    store.delete_column(columns[0].id).unwrap();
    let shifted = store.close_ordinal_gap(board.id, columns[0].ordinal).unwrap();
    assert_eq!(shifted, 2);

    let remaining = store.find_columns(board.id).unwrap();
    let names: Vec<_> = remaining.iter().map(|c| c.name.as_str()).collect();
    let ordinals: Vec<_> = remaining.iter().map(|c| c.ordinal).collect();
    assert_eq!(names, vec!["In Progress", "Done"]);
    assert_eq!(ordinals, vec![1, 2]);
}

#[test]
fn test_update_column_name() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (_, columns) = seeded(&mut store);

    let patch = ColumnPatch {
        name: Some("Backlog".to_string()),
    };
    let updated = store.update_column(columns[0].id, &patch).unwrap();
    assert_eq!(updated.name, "Backlog");
    assert_eq!(updated.ordinal, 1);

    // Empty patch returns the column unchanged
    let same = store.update_column(columns[0].id, &ColumnPatch::default()).unwrap();
    assert_eq!(same, updated);
}

#[test]
fn test_task_crud() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (_, columns) = seeded(&mut store);

    let task = new_task(columns[0].id, "Write docs");
    store.insert_task(&task).unwrap();
    assert_eq!(store.find_task(task.id).unwrap(), Some(task.clone()));

    let patch = TaskPatch {
        title: Some("Write better docs".to_string()),
        ..Default::default()
    };
    let updated = store.update_task(task.id, &patch).unwrap();
    assert_eq!(updated.title, "Write better docs");
    assert_eq!(updated.description, task.description);

    let moved = store.set_task_column(task.id, columns[2].id).unwrap();
    assert_eq!(moved.column_id, columns[2].id);

    store.delete_task(task.id).unwrap();
    assert!(store.find_task(task.id).unwrap().is_none());
    assert!(store.delete_task(task.id).unwrap_err().is_not_found());
}

#[test]
fn test_deadline_beyond_signed_range_is_rejected() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (_, columns) = seeded(&mut store);

    let mut task = new_task(columns[0].id, "Someday");
    task.deadline = u64::MAX;
    assert!(matches!(store.insert_task(&task), Err(GatewayError::Backend(_))));
    assert!(store.find_task(task.id).unwrap().is_none());

    task.deadline = 1_900_000_000;
    store.insert_task(&task).unwrap();
    let patch = TaskPatch {
        deadline: Some(i64::MAX as u64 + 1),
        ..Default::default()
    };
    assert!(matches!(
        store.update_task(task.id, &patch),
        Err(GatewayError::Backend(_))
    ));
    assert_eq!(store.find_task(task.id).unwrap().unwrap().deadline, 1_900_000_000);
}

#[test]
fn test_find_tasks_across_columns() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (_, columns) = seeded(&mut store);

    store.insert_task(&new_task(columns[0].id, "a")).unwrap();
    store.insert_task(&new_task(columns[0].id, "b")).unwrap();
    store.insert_task(&new_task(columns[1].id, "c")).unwrap();
    store.insert_task(&new_task(columns[2].id, "d")).unwrap();

    let ids = [columns[0].id, columns[1].id];
    assert_eq!(store.find_tasks(&ids).unwrap().len(), 3);
    assert!(store.find_tasks(&[]).unwrap().is_empty());
}

#[test]
fn test_delete_board_tree_removes_everything() {
    let mut store = SqliteStore::in_memory().unwrap();
    let (board, columns) = seeded(&mut store);
    let (survivor, survivor_columns) = {
        let b = new_board("alice", "Keep me", 1);
        let c = vec![new_column(b.id, "To Do", 1)];
        store.insert_board(&b, &c).unwrap();
        (b, c)
    };

    for column in &columns {
        store.insert_task(&new_task(column.id, "x")).unwrap();
    }
    store.insert_task(&new_task(columns[0].id, "y")).unwrap();
    store.insert_task(&new_task(survivor_columns[0].id, "z")).unwrap();

    let removal = store.delete_board_tree(board.id).unwrap();
    assert_eq!(removal.columns, 3);
    assert_eq!(removal.tasks, 4);

    assert!(store.find_board(board.id).unwrap().is_none());
    assert!(store.find_columns(board.id).unwrap().is_empty());
    let column_ids: Vec<_> = columns.iter().map(|c| c.id).collect();
    assert!(store.find_tasks(&column_ids).unwrap().is_empty());

    // Unrelated boards are untouched
    assert!(store.find_board(survivor.id).unwrap().is_some());
    assert_eq!(store.find_tasks(&[survivor_columns[0].id]).unwrap().len(), 1);
}

#[test]
fn test_delete_board_tree_missing_board() {
    let mut store = SqliteStore::in_memory().unwrap();
    let result = store.delete_board_tree(BoardId::new());
    assert!(matches!(result, Err(GatewayError::NotFound { entity: "board", .. })));
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boards.db");

    let board_id = {
        let mut store = SqliteStore::new(&path).unwrap();
        let (board, _) = seeded(&mut store);
        board.id
    };

    let store = SqliteStore::new(&path).unwrap();
    let board = store.find_board(board_id).unwrap().unwrap();
    assert_eq!(board.column_count, 3);
    assert_eq!(store.find_columns(board_id).unwrap().len(), 3);
}
