//! Minimal resource shapes consulted by record-level permission checks.
//!
//! These carry only the fields the permission engine reads. The dashboard's
//! full project/task models live with its CRUD layer, out of scope here.

use serde::{Deserialize, Serialize};

use crate::Id;

/// Role of a user within a single project's membership list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Lead,
    Member,
}

/// One entry in a project's membership list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: Id,
    pub role: MemberRole,
}

/// A project, as seen by contextual permission checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub members: Vec<ProjectMember>,
}

impl Project {
    /// Whether `user_id` appears in the membership list with the LEAD role.
    pub fn has_lead(&self, user_id: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.user_id == user_id && m.role == MemberRole::Lead)
    }
}

/// A task, as seen by contextual permission checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Id>,
}
