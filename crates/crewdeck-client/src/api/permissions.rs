//! Permissions API.
//!
//! Every endpoint returns the affected user's full [`PermissionMatrix`];
//! there is no partial-update endpoint, consistent with the client-side
//! wholesale-replace policy.

use crewdeck_types::PermissionMatrix;

use crate::client::CrewdeckClient;
use crate::error::Result;

/// Body for a permissions update.
#[derive(Debug, serde::Serialize)]
pub struct UpdatePermissionsRequest {
    /// The complete replacement matrix.
    pub permissions: PermissionMatrix,
}

/// Permissions API client.
pub struct PermissionsApi {
    client: CrewdeckClient,
}

impl PermissionsApi {
    pub(crate) fn new(client: CrewdeckClient) -> Self {
        Self { client }
    }

    /// Fetch the full permission matrix for a user.
    pub async fn get(&self, user_id: &str) -> Result<PermissionMatrix> {
        self.client.get(&format!("permissions/{}", user_id)).await
    }

    /// Replace a user's permission matrix.
    pub async fn update(&self, user_id: &str, permissions: PermissionMatrix) -> Result<PermissionMatrix> {
        self.client
            .put(
                &format!("permissions/{}", user_id),
                &UpdatePermissionsRequest { permissions },
            )
            .await
    }

    /// Reset a user's permission matrix to their role defaults.
    pub async fn reset(&self, user_id: &str) -> Result<PermissionMatrix> {
        self.client
            .post(&format!("permissions/{}/reset", user_id), &serde_json::json!({}))
            .await
    }
}
