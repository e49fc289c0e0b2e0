//! Calendar event publishing
//!
//! Creating a task with `in_calendar` set emits a [`CalendarEvent`]. The
//! publish is fire-and-forget: it runs on a detached task, failures are
//! logged, and nothing is retried.

use async_trait::async_trait;
use boardwalk_domain::Task;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Default topic for calendar events
pub const DEFAULT_TOPIC: &str = "board.event";

/// Default publish timeout (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors from an event publisher
#[derive(Debug, Error)]
pub enum PublishError {
    /// Payload could not be encoded
    #[error("Failed to encode event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Network or client failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status
    #[error("Event rejected with HTTP {0}")]
    Rejected(u16),

    /// Publish did not complete in time
    #[error("Publish timed out after {0:?}")]
    Timeout(Duration),
}

/// Event-publishing collaborator
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `payload` on `topic`, partitioned by `key`
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<(), PublishError>;
}

/// Where and how calendar events are published
#[derive(Debug, Clone)]
pub struct EventSettings {
    /// Topic name
    pub topic: String,
    /// Per-publish timeout
    pub timeout: Duration,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Payload announcing a calendar-visible task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    /// Always `"create"` for now
    pub event_type: String,
    /// Task title
    pub title: String,
    /// Task description
    pub description: String,
    /// Deadline, RFC 3339
    pub deadline: String,
    /// Identity that created the task
    pub user_id: String,
}

impl CalendarEvent {
    /// Event for a freshly created task
    pub fn created(task: &Task, user_id: &str) -> Self {
        Self {
            event_type: "create".to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: rfc3339(task.deadline),
            user_id: user_id.to_string(),
        }
    }
}

/// Format Unix seconds as RFC 3339 (UTC)
pub fn rfc3339(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| secs.to_string())
}

/// Publisher that only logs the event
///
/// Used when no event endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
        _timeout: Duration,
    ) -> Result<(), PublishError> {
        tracing::info!(
            topic,
            key,
            payload = %String::from_utf8_lossy(payload),
            "calendar event"
        );
        Ok(())
    }
}

/// Publisher that POSTs events to an HTTP endpoint
///
/// Events go to `{endpoint}/topics/{topic}` with the partition key in the
/// `x-event-key` header.
pub struct WebhookPublisher {
    endpoint: String,
    client: reqwest::Client,
}

impl WebhookPublisher {
    /// Create a publisher for the given base endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// URL events for `topic` are posted to
    pub fn topic_url(&self, topic: &str) -> String {
        format!("{}/topics/{}", self.endpoint, topic)
    }
}

#[async_trait]
impl EventPublisher for WebhookPublisher {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<(), PublishError> {
        let response = self
            .client
            .post(self.topic_url(topic))
            .header("x-event-key", key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Timeout(timeout)
                } else {
                    PublishError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardwalk_domain::{ColumnId, TaskId};

    #[test]
    fn test_rfc3339() {
        assert_eq!(rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(rfc3339(1_700_000_000), "2023-11-14T22:13:20Z");
        assert_eq!(rfc3339(u64::MAX), u64::MAX.to_string());
    }

    #[test]
    fn test_calendar_event_payload() {
        let task = Task {
            id: TaskId::new(),
            title: "Demo".to_string(),
            description: "Show the board".to_string(),
            deadline: 1_700_000_000,
            in_calendar: true,
            column_id: ColumnId::new(),
        };

        let event = CalendarEvent::created(&task, "alice");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "create");
        assert_eq!(json["title"], "Demo");
        assert_eq!(json["deadline"], "2023-11-14T22:13:20Z");
        assert_eq!(json["user_id"], "alice");
    }

    #[test]
    fn test_topic_url_strips_trailing_slash() {
        let publisher = WebhookPublisher::new("http://localhost:8082/");
        assert_eq!(
            publisher.topic_url("board.event"),
            "http://localhost:8082/topics/board.event"
        );
    }
}
