//! Wire protocol for the realtime channel.
//!
//! Events are JSON text frames with an `event` tag and a `payload`, matching
//! the server's channel framing. Tag strings are wire-exact; do not rename.

use serde::{Deserialize, Serialize};

use crewdeck_types::{Id, PermissionMatrix, Timestamp};

/// Events sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientEvent {
    /// Authenticate the channel. Sent once per (re)connect, before any join.
    #[serde(rename = "auth")]
    Auth {
        /// Bearer token for authentication.
        token: String,
    },
    /// Join the per-user room.
    #[serde(rename = "join:user")]
    JoinUser(Id),
    /// Join the per-tenant room.
    #[serde(rename = "join:tenant")]
    JoinTenant(Id),
}

/// Events pushed from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerEvent {
    /// A user-visible notification.
    #[serde(rename = "notification")]
    Notification(NotificationEvent),
    /// Permissions changed for a user; scoped to that user's own session.
    #[serde(rename = "permission:updated")]
    PermissionUpdated(PermissionUpdatedEvent),
    /// Informational permission-change broadcast for administrators.
    #[serde(rename = "permission:updated:admin")]
    PermissionUpdatedAdmin(PermissionUpdatedAdminEvent),
    /// Server-initiated directive to re-issue a user room join.
    #[serde(rename = "force:join:user")]
    ForceJoinUser(Id),
}

/// Payload of a `notification` event.
///
/// Every field except the type is optional on the wire: partial payloads
/// are routed to a generic fallback alert rather than dropped, so data loss
/// on the server side stays visible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    /// Event type, e.g. `TASK_ASSIGNED`. Empty when the server omits it.
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Server-supplied event time, epoch milliseconds.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<Timestamp>,
    /// Explicit target; events for other users are discarded.
    #[serde(default)]
    pub target_user_id: Option<Id>,
    #[serde(default)]
    pub task_id: Option<Id>,
    #[serde(default)]
    pub project_id: Option<Id>,
    /// User who performed the action, for self-echo suppression.
    #[serde(default)]
    pub changed_by: Option<Id>,
}

/// Payload of a `permission:updated` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionUpdatedEvent {
    /// The user whose permissions changed.
    pub user_id: Id,
    /// The complete replacement matrix.
    pub permissions: PermissionMatrix,
    /// The actor who made the change.
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Payload of a `permission:updated:admin` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionUpdatedAdminEvent {
    /// The affected user, for the admin's list view.
    pub user: AffectedUser,
    /// The actor who made the change.
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Name of the user affected by an admin-observed permission change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedUser {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl AffectedUser {
    /// Display name for alerts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
