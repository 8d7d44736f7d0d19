//! DAG runs API.

use crate::client::AirflowClient;
use crate::error::Result;
use crate::types::{DagRun, DagRunCollection, TriggerDagRunRequest};

/// Query parameters for listing DAG runs.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct ListDagRunsQuery {
    /// Filter by state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Maximum number of runs to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Sort field, e.g. `-start_date`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

/// DAG runs API client.
pub struct DagRunsApi {
    client: AirflowClient,
}

impl DagRunsApi {
    pub(crate) fn new(client: AirflowClient) -> Self {
        Self { client }
    }

    /// Trigger a new run of a DAG.
    pub async fn trigger(&self, dag_id: &str, request: &TriggerDagRunRequest) -> Result<DagRun> {
        self.client.post(&["dags", dag_id, "dagRuns"], request).await
    }

    /// List runs of a DAG.
    pub async fn list(&self, dag_id: &str, query: &ListDagRunsQuery) -> Result<DagRunCollection> {
        self.client
            .get_with_query(&["dags", dag_id, "dagRuns"], query)
            .await
    }

    /// Get a run by DAG ID and run ID.
    pub async fn get(&self, dag_id: &str, dag_run_id: &str) -> Result<DagRun> {
        self.client
            .get(&["dags", dag_id, "dagRuns", dag_run_id])
            .await
    }

    /// Delete a run.
    pub async fn delete(&self, dag_id: &str, dag_run_id: &str) -> Result<()> {
        self.client
            .delete(&["dags", dag_id, "dagRuns", dag_run_id])
            .await
    }
}
