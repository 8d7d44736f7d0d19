//! Health API.

use crate::client::AirflowClient;
use crate::error::Result;
use crate::types::HealthInfo;

/// Health API client.
///
/// Note: Airflow serves `/health` without authentication.
pub struct HealthApi {
    client: AirflowClient,
}

impl HealthApi {
    pub(crate) fn new(client: AirflowClient) -> Self {
        Self { client }
    }

    /// Fetch metadatabase and scheduler health.
    pub async fn check(&self) -> Result<HealthInfo> {
        self.client.get(&["health"]).await
    }

    /// Simple connectivity check - returns true if every component is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.check().await.map(|h| h.is_healthy()).unwrap_or(false)
    }
}
