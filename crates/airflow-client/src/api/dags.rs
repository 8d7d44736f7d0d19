//! DAGs API.

use super::{PageQuery, UpdateMask};
use crate::client::AirflowClient;
use crate::error::Result;
use crate::types::{Dag, DagCollection, UpdateDagRequest};

/// DAGs API client.
pub struct DagsApi {
    client: AirflowClient,
}

impl DagsApi {
    pub(crate) fn new(client: AirflowClient) -> Self {
        Self { client }
    }

    /// List DAGs.
    pub async fn list(&self, query: PageQuery) -> Result<DagCollection> {
        self.client.get_with_query(&["dags"], &query).await
    }

    /// Get a DAG by ID.
    pub async fn get(&self, dag_id: &str) -> Result<Dag> {
        self.client.get(&["dags", dag_id]).await
    }

    /// Pause or unpause a DAG.
    pub async fn set_paused(&self, dag_id: &str, is_paused: bool) -> Result<Dag> {
        self.client
            .patch(
                &["dags", dag_id],
                &UpdateDagRequest { is_paused },
                &UpdateMask {
                    update_mask: "is_paused",
                },
            )
            .await
    }

    /// Delete a DAG and all its metadata.
    pub async fn delete(&self, dag_id: &str) -> Result<()> {
        self.client.delete(&["dags", dag_id]).await
    }
}
