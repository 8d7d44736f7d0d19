//! Roles API.

use super::UpdateMask;
use crate::client::AirflowClient;
use crate::error::Result;
use crate::types::Role;

/// Roles API client.
pub struct RolesApi {
    client: AirflowClient,
}

impl RolesApi {
    pub(crate) fn new(client: AirflowClient) -> Self {
        Self { client }
    }

    /// Get a role by name.
    pub async fn get(&self, name: &str) -> Result<Role> {
        self.client.get(&["roles", name]).await
    }

    /// Create a role.
    pub async fn create(&self, role: &Role) -> Result<Role> {
        self.client.post(&["roles"], role).await
    }

    /// Replace the permissions of an existing role.
    pub async fn update(&self, name: &str, role: &Role) -> Result<Role> {
        self.client
            .patch(
                &["roles", name],
                role,
                &UpdateMask {
                    update_mask: "actions",
                },
            )
            .await
    }

    /// Delete a role.
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.client.delete(&["roles", name]).await
    }
}
