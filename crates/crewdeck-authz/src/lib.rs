//! Client-side permission engine for the Crewdeck dashboard.
//!
//! Pure, deterministic authorization decisions: (identity, optional
//! resource) in, capability booleans out. No I/O, no caching, no clocks.
//!
//! Decisions rendered in the UI are advisory — the server is the
//! enforcement boundary. The engine must never grant a capability the
//! server would deny; denying something the server would allow only
//! degrades UX and is acceptable.

pub mod engine;

pub use engine::{
    allowed_roles, can, can_assign_tasks, can_create_projects, can_create_tasks,
    can_delete_projects, can_delete_task, can_delete_tasks, can_do_tenant_work, can_edit_project,
    can_edit_task, can_manage_tasks, can_manage_tenants, can_manage_users, can_view_audit_logs,
    can_view_reports, can_view_users, has_any_role, has_role, Capability,
};
