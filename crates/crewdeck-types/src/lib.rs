//! Shared types for the Crewdeck dashboard client.
//!
//! Everything the authorization engine and the realtime sync subsystem agree
//! on lives here: the canonical [`Identity`], the [`PermissionMatrix`],
//! notification records, and the minimal resource shapes consulted by
//! record-level permission checks.

pub mod error;
pub mod identity;
pub mod notification;
pub mod permissions;
pub mod resource;

pub use error::{Error, Result};
pub use identity::{Identity, Role};
pub use notification::Notification;
pub use permissions::{Action, PermissionMatrix};
pub use resource::{MemberRole, Project, ProjectMember, Task};

/// Identifier type used throughout the system (server-assigned, opaque).
pub type Id = String;

/// Timestamp type used throughout the system.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new unique identifier.
pub fn new_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

/// Get the current timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
