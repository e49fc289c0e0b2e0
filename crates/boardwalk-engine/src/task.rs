//! Task operations

use crate::engine::{now_secs, BoardEngine};
use crate::error::{EngineError, EngineResult};
use crate::input::{CreateTaskInput, MoveTaskInput};
use crate::validate;
use boardwalk_domain::{HierarchyStore, Task, TaskId, TaskPatch};

impl<S> BoardEngine<S>
where
    S: HierarchyStore + Send + 'static,
{
    /// Create a task in an existing column
    ///
    /// When `in_calendar` is set a calendar event for `owner_id` is
    /// dispatched after the task is stored. The dispatch is never awaited
    /// and its failure does not affect the result.
    pub async fn create_task(&self, owner_id: &str, input: CreateTaskInput) -> EngineResult<Task> {
        let owner_id = validate::required("owner id", owner_id)?;
        let title = validate::required("title", &input.title)?;
        let description = validate::required("description", &input.description)?;
        validate::future_deadline(input.deadline, now_secs())?;
        let column_id = input.column_id;

        let task = Task {
            id: TaskId::new(),
            title,
            description,
            deadline: input.deadline,
            in_calendar: input.in_calendar,
            column_id,
        };

        let task = self
            .unit("create_task", move |store| {
                if store.find_column(column_id)?.is_none() {
                    return Err(EngineError::ColumnNotFound(column_id));
                }
                store.insert_task(&task)?;
                tracing::info!(task = %task.id, column = %column_id, "task created");
                Ok(task)
            })
            .await?;

        if task.in_calendar {
            self.announce(&task, &owner_id);
        }
        Ok(task)
    }

    /// Get a task by id
    pub async fn get_task(&self, task_id: TaskId) -> EngineResult<Task> {
        self.unit("get_task", move |store| {
            store
                .find_task(task_id)?
                .ok_or(EngineError::TaskNotFound(task_id))
        })
        .await
    }

    /// Move a task to another column
    ///
    /// A missing task and a missing destination are reported as distinct
    /// errors. Neither case modifies the task.
    pub async fn move_task(&self, input: MoveTaskInput) -> EngineResult<Task> {
        let MoveTaskInput { task_id, column_id } = input;

        self.unit("move_task", move |store| {
            if store.find_task(task_id)?.is_none() {
                return Err(EngineError::TaskNotFound(task_id));
            }
            if store.find_column(column_id)?.is_none() {
                return Err(EngineError::DestinationColumnNotFound(column_id));
            }

            let moved = store
                .set_task_column(task_id, column_id)
                .map_err(|e| EngineError::or_missing(e, EngineError::TaskNotFound(task_id)))?;
            tracing::info!(task = %task_id, column = %column_id, "task moved");
            Ok(moved)
        })
        .await
    }

    /// Apply a partial update to a task
    ///
    /// A supplied deadline must lie in the future. An empty patch returns
    /// the task unchanged.
    pub async fn update_task(&self, task_id: TaskId, patch: TaskPatch) -> EngineResult<Task> {
        let patch = TaskPatch {
            title: validate::optional("title", &patch.title)?,
            description: validate::optional("description", &patch.description)?,
            deadline: patch.deadline,
        };
        if let Some(deadline) = patch.deadline {
            validate::future_deadline(deadline, now_secs())?;
        }

        self.unit("update_task", move |store| {
            let task = store
                .find_task(task_id)?
                .ok_or(EngineError::TaskNotFound(task_id))?;
            if patch.is_empty() {
                return Ok(task);
            }

            let updated = store
                .update_task(task_id, &patch)
                .map_err(|e| EngineError::or_missing(e, EngineError::TaskNotFound(task_id)))?;
            tracing::info!(task = %task_id, "task updated");
            Ok(updated)
        })
        .await
    }

    /// Delete a task
    pub async fn delete_task(&self, task_id: TaskId) -> EngineResult<()> {
        self.unit("delete_task", move |store| {
            store
                .delete_task(task_id)
                .map_err(|e| EngineError::or_missing(e, EngineError::TaskNotFound(task_id)))?;
            tracing::info!(task = %task_id, "task deleted");
            Ok(())
        })
        .await
    }
}
