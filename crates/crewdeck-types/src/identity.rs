//! The authenticated identity driving every authorization check.
//!
//! An [`Identity`] is built exactly once, at the authentication boundary,
//! and replaced wholesale on login/logout. Nothing downstream should ever
//! re-derive user or tenant identifiers from raw payloads.

use serde::{Deserialize, Serialize};

use crate::Id;

/// Tenant-id value the server uses for cross-tenant administrators.
pub const CROSS_TENANT: &str = "*";

/// Closed set of platform roles, highest authority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Cross-tenant platform administrator. Excluded from tenant-scoped work.
    SuperAdmin,
    /// Administrator of a single tenant.
    OrgAdmin,
    /// Manages projects and tasks within a tenant.
    ProjectManager,
    /// Regular tenant member.
    Employee,
}

impl Role {
    /// Authority rank; higher means more authority.
    ///
    /// This is a partial ordering aid for tests and display, not an
    /// enforcement mechanism: capabilities are granted by explicit role
    /// sets, never by rank comparison.
    pub fn authority(self) -> u8 {
        match self {
            Role::SuperAdmin => 3,
            Role::OrgAdmin => 2,
            Role::ProjectManager => 1,
            Role::Employee => 0,
        }
    }

    /// Whether `self` has strictly more authority than `other`.
    pub fn outranks(self, other: Role) -> bool {
        self.authority() > other.authority()
    }

    /// All roles, highest authority first.
    pub fn all() -> [Role; 4] {
        [
            Role::SuperAdmin,
            Role::OrgAdmin,
            Role::ProjectManager,
            Role::Employee,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::OrgAdmin => "ORG_ADMIN",
            Role::ProjectManager => "PROJECT_MANAGER",
            Role::Employee => "EMPLOYEE",
        };
        f.write_str(s)
    }
}

/// The authenticated subject: user id, tenant id, role.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Server-assigned user id.
    pub user_id: Id,
    /// Tenant the user belongs to. `None` for cross-tenant identities.
    pub tenant_id: Option<Id>,
    /// Platform role.
    pub role: Role,
}

impl Identity {
    /// Build a canonical identity from raw authentication output.
    ///
    /// Normalizes the tenant id: an empty string or the cross-tenant
    /// sentinel collapses to `None`, so the rest of the subsystem never
    /// has to type-sniff tenant values.
    pub fn new(user_id: impl Into<Id>, tenant_id: Option<String>, role: Role) -> Self {
        let tenant_id = tenant_id.filter(|t| !t.is_empty() && t != CROSS_TENANT);
        Self {
            user_id: user_id.into(),
            tenant_id,
            role,
        }
    }

    /// Whether this identity may participate in tenant-scoped work
    /// (projects, tasks). Cross-tenant administrators may not.
    pub fn is_tenant_scoped(&self) -> bool {
        self.role != Role::SuperAdmin
    }
}
