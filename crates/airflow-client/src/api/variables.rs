//! Variables API.

use super::UpdateMask;
use crate::client::AirflowClient;
use crate::error::Result;
use crate::types::Variable;

/// Variables API client.
pub struct VariablesApi {
    client: AirflowClient,
}

impl VariablesApi {
    pub(crate) fn new(client: AirflowClient) -> Self {
        Self { client }
    }

    /// Get a variable by key.
    pub async fn get(&self, key: &str) -> Result<Variable> {
        self.client.get(&["variables", key]).await
    }

    /// Create a variable.
    pub async fn create(&self, variable: &Variable) -> Result<Variable> {
        self.client.post(&["variables"], variable).await
    }

    /// Update the value (and description) of an existing variable.
    pub async fn update(&self, key: &str, variable: &Variable) -> Result<Variable> {
        let mask = if variable.description.is_some() {
            "value,description"
        } else {
            "value"
        };
        self.client
            .patch(&["variables", key], variable, &UpdateMask { update_mask: mask })
            .await
    }

    /// Delete a variable.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client.delete(&["variables", key]).await
    }
}
