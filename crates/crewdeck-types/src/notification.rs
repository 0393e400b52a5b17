//! In-memory notification records.

use serde::{Deserialize, Serialize};

use crate::{Id, Timestamp, new_id};

/// A user-visible notification materialized from an inbound channel event.
///
/// Notifications live only for the current session: `read` flips through
/// explicit user action and records are removed only by explicit dismissal,
/// never silently expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Locally generated id (the server does not assign notification ids).
    pub id: Id,
    /// Raw event type, e.g. `TASK_ASSIGNED`.
    pub event_type: String,
    pub title: String,
    pub message: String,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_task_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_project_id: Option<Id>,
    pub read: bool,
}

impl Notification {
    /// Create a new unread notification with a fresh local id.
    pub fn new(
        event_type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: new_id(),
            event_type: event_type.into(),
            title: title.into(),
            message: message.into(),
            timestamp,
            target_user_id: None,
            related_task_id: None,
            related_project_id: None,
            read: false,
        }
    }
}
