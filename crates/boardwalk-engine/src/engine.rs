//! The engine handle and its unit-of-work runner

use crate::error::{EngineError, EngineResult};
use crate::events::{CalendarEvent, EventPublisher, EventSettings, PublishError, TracingPublisher};
use boardwalk_domain::{GatewayError, HierarchyStore, Task};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hierarchy consistency engine over a storage gateway
///
/// Cloning is cheap: clones share the same store and publisher.
///
/// # Examples
///
/// ```no_run
/// use boardwalk_engine::{BoardEngine, CreateBoardInput};
/// use boardwalk_domain::Methodology;
/// use boardwalk_store::SqliteStore;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = BoardEngine::new(SqliteStore::in_memory()?);
/// let view = engine
///     .create_board(
///         "alice",
///         CreateBoardInput {
///             title: "Sprint 1".into(),
///             description: "First sprint".into(),
///             methodology: Methodology::Kanban,
///             category: "work".into(),
///         },
///     )
///     .await?;
/// assert_eq!(view.columns.len(), 3);
/// # Ok(())
/// # }
/// ```
pub struct BoardEngine<S> {
    store: Arc<Mutex<S>>,
    publisher: Arc<dyn EventPublisher>,
    events: EventSettings,
}

impl<S> Clone for BoardEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            publisher: Arc::clone(&self.publisher),
            events: self.events.clone(),
        }
    }
}

impl<S> BoardEngine<S>
where
    S: HierarchyStore + Send + 'static,
{
    /// Create an engine that logs calendar events instead of sending them
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            publisher: Arc::new(TracingPublisher),
            events: EventSettings::default(),
        }
    }

    /// Replace the event publisher
    pub fn with_publisher(
        mut self,
        publisher: Arc<dyn EventPublisher>,
        events: EventSettings,
    ) -> Self {
        self.publisher = publisher;
        self.events = events;
        self
    }

    /// Run `work` against the store as one uninterrupted unit
    ///
    /// The unit executes on the blocking pool. If the caller drops the
    /// returned future, it stops waiting but the unit still runs to the
    /// end, so a multi-step mutation is never abandoned halfway.
    pub(crate) async fn unit<T, F>(&self, operation: &'static str, work: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> EngineResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut guard = store.lock().map_err(|_| {
                EngineError::Storage(GatewayError::Backend("store lock poisoned".to_string()))
            })?;
            work(&mut *guard)
        })
        .await
        .map_err(|e| {
            EngineError::Storage(GatewayError::Backend(format!(
                "{} worker failed: {}",
                operation, e
            )))
        })?
    }

    /// Dispatch the calendar event for `task` on a detached task
    pub(crate) fn announce(&self, task: &Task, user_id: &str) {
        let event = CalendarEvent::created(task, user_id);
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(task = %task.id, error = %e, "failed to encode calendar event");
                return;
            }
        };

        let publisher = Arc::clone(&self.publisher);
        let topic = self.events.topic.clone();
        let timeout = self.events.timeout;
        let key = user_id.to_string();
        let task_id = task.id;

        tokio::spawn(async move {
            let outcome = tokio::time::timeout(
                timeout,
                publisher.publish(&topic, &key, &payload, timeout),
            )
            .await
            .unwrap_or(Err(PublishError::Timeout(timeout)));

            match outcome {
                Ok(()) => tracing::debug!(task = %task_id, topic = %topic, "calendar event published"),
                Err(e) => tracing::warn!(
                    task = %task_id,
                    topic = %topic,
                    error = %e,
                    "failed to publish calendar event"
                ),
            }
        });
    }
}

/// Current time in Unix seconds
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
