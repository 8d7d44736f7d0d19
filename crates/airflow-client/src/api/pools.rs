//! Pools API.

use super::UpdateMask;
use crate::client::AirflowClient;
use crate::error::Result;
use crate::types::{Pool, PoolRequest};

/// Pools API client.
pub struct PoolsApi {
    client: AirflowClient,
}

impl PoolsApi {
    pub(crate) fn new(client: AirflowClient) -> Self {
        Self { client }
    }

    /// Get a pool by name.
    pub async fn get(&self, name: &str) -> Result<Pool> {
        self.client.get(&["pools", name]).await
    }

    /// Create a pool.
    pub async fn create(&self, request: &PoolRequest) -> Result<Pool> {
        self.client.post(&["pools"], request).await
    }

    /// Resize an existing pool.
    pub async fn update(&self, name: &str, request: &PoolRequest) -> Result<Pool> {
        self.client
            .patch(
                &["pools", name],
                request,
                &UpdateMask {
                    update_mask: "slots",
                },
            )
            .await
    }

    /// Delete a pool.
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.client.delete(&["pools", name]).await
    }
}
