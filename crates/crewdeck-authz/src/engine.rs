//! Role- and context-sensitive permission predicates.
//!
//! Every coarse capability is a fixed role-set membership test defined once
//! in [`allowed_roles`]; the named predicates and any future server-side
//! mirror must derive from that table rather than re-encoding it.
//!
//! All predicates are total: an absent identity or absent resource yields
//! `false`, never a panic.

use crewdeck_types::{Identity, Project, Role, Task};

/// Coarse capabilities gated purely by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageTenants,
    ManageUsers,
    ViewUsers,
    CreateProjects,
    DeleteProjects,
    ManageTasks,
    CreateTasks,
    AssignTasks,
    DeleteTasks,
    ViewReports,
    ViewAuditLogs,
    TenantWork,
}

impl Capability {
    /// Every coarse capability, for table-driven tests.
    pub fn all() -> [Capability; 12] {
        [
            Capability::ManageTenants,
            Capability::ManageUsers,
            Capability::ViewUsers,
            Capability::CreateProjects,
            Capability::DeleteProjects,
            Capability::ManageTasks,
            Capability::CreateTasks,
            Capability::AssignTasks,
            Capability::DeleteTasks,
            Capability::ViewReports,
            Capability::ViewAuditLogs,
            Capability::TenantWork,
        ]
    }

    /// Whether this capability applies only to tenant-scoped work.
    ///
    /// Tenant-scoped capabilities exclude `SUPER_ADMIN` even though it
    /// outranks every tenant role: cross-tenant administrators do not
    /// participate in tenant-scoped projects and tasks.
    pub fn is_tenant_scoped(self) -> bool {
        matches!(
            self,
            Capability::CreateProjects
                | Capability::DeleteProjects
                | Capability::ManageTasks
                | Capability::CreateTasks
                | Capability::AssignTasks
                | Capability::DeleteTasks
                | Capability::TenantWork
        )
    }
}

/// The capability table: the single source of truth for role sets.
pub fn allowed_roles(capability: Capability) -> &'static [Role] {
    use Role::*;
    match capability {
        Capability::ManageTenants => &[SuperAdmin],
        Capability::ManageUsers => &[SuperAdmin, OrgAdmin],
        Capability::ViewUsers => &[SuperAdmin, OrgAdmin, ProjectManager],
        Capability::CreateProjects => &[OrgAdmin, ProjectManager],
        // Deliberately narrower than CreateProjects/edit: ORG_ADMIN only.
        Capability::DeleteProjects => &[OrgAdmin],
        Capability::ManageTasks => &[OrgAdmin, ProjectManager],
        Capability::CreateTasks => &[OrgAdmin, ProjectManager],
        Capability::AssignTasks => &[OrgAdmin, ProjectManager],
        Capability::DeleteTasks => &[OrgAdmin, ProjectManager],
        Capability::ViewReports => &[SuperAdmin, OrgAdmin, ProjectManager],
        Capability::ViewAuditLogs => &[SuperAdmin, OrgAdmin],
        Capability::TenantWork => &[OrgAdmin, ProjectManager, Employee],
    }
}

/// Membership test against the capability table.
pub fn can(identity: Option<&Identity>, capability: Capability) -> bool {
    match identity {
        Some(id) => allowed_roles(capability).contains(&id.role),
        None => false,
    }
}

/// Exact role match.
pub fn has_role(identity: Option<&Identity>, role: Role) -> bool {
    identity.map(|id| id.role == role).unwrap_or(false)
}

/// Membership test against an arbitrary role set.
pub fn has_any_role(identity: Option<&Identity>, roles: &[Role]) -> bool {
    identity.map(|id| roles.contains(&id.role)).unwrap_or(false)
}

pub fn can_manage_tenants(identity: Option<&Identity>) -> bool {
    can(identity, Capability::ManageTenants)
}

pub fn can_manage_users(identity: Option<&Identity>) -> bool {
    can(identity, Capability::ManageUsers)
}

pub fn can_view_users(identity: Option<&Identity>) -> bool {
    can(identity, Capability::ViewUsers)
}

pub fn can_create_projects(identity: Option<&Identity>) -> bool {
    can(identity, Capability::CreateProjects)
}

pub fn can_delete_projects(identity: Option<&Identity>) -> bool {
    can(identity, Capability::DeleteProjects)
}

pub fn can_manage_tasks(identity: Option<&Identity>) -> bool {
    can(identity, Capability::ManageTasks)
}

pub fn can_create_tasks(identity: Option<&Identity>) -> bool {
    can(identity, Capability::CreateTasks)
}

pub fn can_assign_tasks(identity: Option<&Identity>) -> bool {
    can(identity, Capability::AssignTasks)
}

pub fn can_delete_tasks(identity: Option<&Identity>) -> bool {
    can(identity, Capability::DeleteTasks)
}

pub fn can_view_reports(identity: Option<&Identity>) -> bool {
    can(identity, Capability::ViewReports)
}

pub fn can_view_audit_logs(identity: Option<&Identity>) -> bool {
    can(identity, Capability::ViewAuditLogs)
}

/// Whether the identity participates in tenant-scoped work at all.
/// Gates whole feature areas (projects, tasks) in the UI.
pub fn can_do_tenant_work(identity: Option<&Identity>) -> bool {
    can(identity, Capability::TenantWork)
}

/// Record-level check: may this identity edit this project?
///
/// `ORG_ADMIN` edits any project in the tenant. A `PROJECT_MANAGER` edits a
/// project they manage, own, or lead. Everyone else is denied.
pub fn can_edit_project(identity: Option<&Identity>, project: Option<&Project>) -> bool {
    let (identity, project) = match (identity, project) {
        (Some(i), Some(p)) => (i, p),
        _ => return false,
    };
    match identity.role {
        Role::OrgAdmin => true,
        Role::ProjectManager => {
            project.manager_id.as_deref() == Some(identity.user_id.as_str())
                || project.owner_id.as_deref() == Some(identity.user_id.as_str())
                || project.has_lead(&identity.user_id)
        }
        _ => false,
    }
}

/// Record-level check: may this identity edit this task?
///
/// For `PROJECT_MANAGER` this always answers `true` client-side with final
/// enforcement deferred to the server: it is a UI-visibility hint, not a
/// security boundary, and tightening it would block edits the server
/// permits. An `EMPLOYEE` edits only tasks assigned to them.
pub fn can_edit_task(identity: Option<&Identity>, task: Option<&Task>) -> bool {
    let (identity, task) = match (identity, task) {
        (Some(i), Some(t)) => (i, t),
        _ => return false,
    };
    match identity.role {
        Role::OrgAdmin | Role::ProjectManager => true,
        Role::Employee => task.assignee_id.as_deref() == Some(identity.user_id.as_str()),
        Role::SuperAdmin => false,
    }
}

/// Record-level check: may this identity delete this task?
pub fn can_delete_task(identity: Option<&Identity>, task: Option<&Task>) -> bool {
    if task.is_none() {
        return false;
    }
    has_any_role(identity, &[Role::OrgAdmin, Role::ProjectManager])
}
