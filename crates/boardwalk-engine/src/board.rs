//! Board operations

use crate::cascade::delete_board_subtree;
use crate::engine::{now_secs, BoardEngine};
use crate::error::{EngineError, EngineResult};
use crate::input::CreateBoardInput;
use crate::validate;
use crate::view::build_board_view;
use boardwalk_domain::{
    Board, BoardId, BoardPatch, BoardView, Column, ColumnId, ColumnView, HierarchyStore,
    SubtreeRemoval,
};

impl<S> BoardEngine<S>
where
    S: HierarchyStore + Send + 'static,
{
    /// Create a board seeded with the preset columns of its methodology
    ///
    /// The title must be unique among the owner's boards, compared
    /// case-insensitively. Board and columns are persisted together.
    pub async fn create_board(
        &self,
        owner_id: &str,
        input: CreateBoardInput,
    ) -> EngineResult<BoardView> {
        let owner_id = validate::required("owner id", owner_id)?;
        let title = validate::required("title", &input.title)?;
        let description = validate::required("description", &input.description)?;
        let category = validate::required("category", &input.category)?;
        let methodology = input.methodology;

        self.unit("create_board", move |store| {
            let taken = store
                .find_boards(Some(&owner_id))?
                .iter()
                .any(|b| validate::same_name(&b.title, &title));
            if taken {
                return Err(EngineError::AlreadyExists(format!(
                    "board titled '{}' already exists",
                    title
                )));
            }

            let now = now_secs();
            let presets = methodology.preset_columns();
            let board = Board {
                id: BoardId::new(),
                title,
                description,
                category,
                methodology,
                progress: 0,
                favorite: false,
                column_count: presets.len() as u32,
                created_at: now,
                updated_at: now,
                owner_id,
            };
            let columns: Vec<Column> = presets
                .iter()
                .zip(1u32..)
                .map(|(name, ordinal)| Column {
                    id: ColumnId::new(),
                    name: (*name).to_string(),
                    ordinal,
                    board_id: board.id,
                })
                .collect();

            store.insert_board(&board, &columns)?;
            tracing::info!(
                board = %board.id,
                owner = %board.owner_id,
                methodology = %board.methodology,
                "board created"
            );

            let columns = columns
                .into_iter()
                .map(|column| ColumnView {
                    column,
                    tasks: Vec::new(),
                })
                .collect();
            Ok(BoardView { board, columns })
        })
        .await
    }

    /// Board with its columns in ordinal order and their tasks
    pub async fn get_board_info(&self, board_id: BoardId) -> EngineResult<BoardView> {
        self.unit("get_board_info", move |store| {
            let view = build_board_view(&*store, board_id)?;
            tracing::debug!(
                board = %board_id,
                columns = view.columns.len(),
                tasks = view.task_count(),
                "built board view"
            );
            Ok(view)
        })
        .await
    }

    /// Board summary without columns
    pub async fn get_board(&self, board_id: BoardId) -> EngineResult<Board> {
        self.unit("get_board", move |store| {
            store
                .find_board(board_id)?
                .ok_or(EngineError::BoardNotFound(board_id))
        })
        .await
    }

    /// Boards owned by `owner_id`
    pub async fn list_boards(&self, owner_id: &str) -> EngineResult<Vec<Board>> {
        let owner_id = validate::required("owner id", owner_id)?;
        self.unit("list_boards", move |store| {
            let boards = store.find_boards(Some(&owner_id))?;
            tracing::debug!(owner = %owner_id, count = boards.len(), "listed boards");
            Ok(boards)
        })
        .await
    }

    /// Apply a partial update to a board and refresh `updated_at`
    pub async fn update_board(&self, board_id: BoardId, patch: BoardPatch) -> EngineResult<Board> {
        if patch.is_empty() {
            return Err(EngineError::invalid("board patch has no fields"));
        }
        let patch = BoardPatch {
            title: validate::optional("title", &patch.title)?,
            description: validate::optional("description", &patch.description)?,
            ..patch
        };
        if let Some(progress) = patch.progress {
            validate::progress(progress)?;
        }

        self.unit("update_board", move |store| {
            let board = store
                .find_board(board_id)?
                .ok_or(EngineError::BoardNotFound(board_id))?;

            if let Some(title) = &patch.title {
                let taken = store
                    .find_boards(Some(&board.owner_id))?
                    .iter()
                    .any(|b| b.id != board_id && validate::same_name(&b.title, title));
                if taken {
                    return Err(EngineError::AlreadyExists(format!(
                        "board titled '{}' already exists",
                        title
                    )));
                }
            }

            let updated = store
                .update_board(board_id, &patch, now_secs())
                .map_err(|e| EngineError::or_missing(e, EngineError::BoardNotFound(board_id)))?;
            tracing::info!(board = %board_id, "board updated");
            Ok(updated)
        })
        .await
    }

    /// Delete a board with all its columns and their tasks
    ///
    /// Either everything is removed or, on failure, nothing is; see
    /// [`EngineError::PartiallyApplied`] for the one exception.
    pub async fn delete_board(&self, board_id: BoardId) -> EngineResult<SubtreeRemoval> {
        self.unit("delete_board", move |store| {
            let board = store
                .find_board(board_id)?
                .ok_or(EngineError::BoardNotFound(board_id))?;

            let removal = delete_board_subtree(store, &board)?;
            tracing::info!(
                board = %board_id,
                columns = removal.columns,
                tasks = removal.tasks,
                "board deleted"
            );
            Ok(removal)
        })
        .await
    }
}
