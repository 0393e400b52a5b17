//! Server-pushed permission synchronization.
//!
//! Applies `permission:updated` events to the local permission matrix
//! without a full reload, and surfaces admin-observer advisories. The
//! matrix is replaced wholesale — partial pushes are unsupported, which is
//! why no merge path exists here or on [`PermissionMatrix`].

use tracing::{debug, warn};

use crewdeck_client::CrewdeckClient;
use crewdeck_types::{Action, Identity, PermissionMatrix};

use crate::alert::{Alert, AlertDispatcher, AlertKind};
use crate::protocol::{PermissionUpdatedAdminEvent, PermissionUpdatedEvent};

/// Owns the local permission matrix for one identity.
///
/// Event wiring is structural: the session dispatches inbound events to
/// this handler directly, so reconnects can neither drop the subscription
/// nor register it twice. (The transport-level listener churn that made
/// re-registration a hazard lives entirely inside the channel driver.)
pub struct PermissionSyncHandler {
    identity: Identity,
    matrix: PermissionMatrix,
    /// Set when a pushed update replaced the matrix; the UI should refresh
    /// permission-gated views and may recommend a reload on inconsistency.
    refresh_needed: bool,
    /// Set when an admin-observer event names an affected user whose record
    /// the admin list view should refetch.
    admin_refetch: Option<String>,
}

impl PermissionSyncHandler {
    /// Create a handler with an initial matrix (usually from the cold-start
    /// fetch; an empty matrix denies everything until the fetch lands).
    pub fn new(identity: Identity, matrix: PermissionMatrix) -> Self {
        Self {
            identity,
            matrix,
            refresh_needed: false,
            admin_refetch: None,
        }
    }

    /// The current permission matrix.
    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// Convenience lookup against the current matrix.
    pub fn allows(&self, module: &str, action: Action) -> bool {
        self.matrix.allows(module, action)
    }

    /// Whether a pushed update has invalidated permission-gated views.
    pub fn refresh_needed(&self) -> bool {
        self.refresh_needed
    }

    /// Acknowledge the refresh signal after the UI has reacted.
    pub fn acknowledge_refresh(&mut self) {
        self.refresh_needed = false;
    }

    /// Take the pending admin list-view refetch signal, if any.
    pub fn take_admin_refetch(&mut self) -> Option<String> {
        self.admin_refetch.take()
    }

    /// Apply a `permission:updated` event.
    ///
    /// Only an update for the current identity mutates the matrix; events
    /// for other users are scoped to those users' own sessions and ignored
    /// here. Returns whether the matrix changed.
    pub fn handle_update(
        &mut self,
        event: PermissionUpdatedEvent,
        alerts: &mut AlertDispatcher,
    ) -> bool {
        if event.user_id != self.identity.user_id {
            debug!(user_id = %event.user_id, "permission update for another user, ignoring");
            return false;
        }

        self.matrix.replace(event.permissions);
        self.refresh_needed = true;

        let actor = event.updated_by.as_deref().unwrap_or("an administrator");
        alerts.dispatch(Alert {
            kind: AlertKind::PermissionChange,
            title: "Your permissions changed".to_string(),
            message: format!(
                "{} updated your permissions. Refresh the page if anything looks out of date.",
                actor
            ),
            target: None,
        });
        true
    }

    /// Apply a `permission:updated:admin` event.
    ///
    /// Informational only: it never mutates the viewing admin's own matrix.
    /// It surfaces an alert and flags the affected user's record for a
    /// list-view refetch.
    pub fn handle_admin_update(
        &mut self,
        event: PermissionUpdatedAdminEvent,
        alerts: &mut AlertDispatcher,
    ) {
        let name = event.user.full_name();
        let actor = event.updated_by.as_deref().unwrap_or("an administrator");
        alerts.dispatch(Alert {
            kind: AlertKind::PermissionChange,
            title: "Permissions updated".to_string(),
            message: format!("{} updated permissions for {}.", actor, name),
            target: None,
        });
        self.admin_refetch = Some(name);
    }

    /// Cold-start (or retry) reload from the authorization service.
    ///
    /// On failure the prior matrix stays in effect — clearing it would
    /// spuriously lock the user out of already-visible UI. The error is
    /// returned for the caller to surface as a retryable state.
    pub async fn reload(&mut self, client: &CrewdeckClient) -> crewdeck_client::Result<()> {
        match client.permissions().get(&self.identity.user_id).await {
            Ok(matrix) => {
                self.matrix.replace(matrix);
                self.refresh_needed = true;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "permission reload failed, keeping prior matrix");
                Err(err)
            }
        }
    }
}
