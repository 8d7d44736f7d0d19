//! `airflow_dag`: pause state of an existing DAG.

use airflow_client::Dag;
use serde::{Deserialize, Serialize};

/// Desired attributes of a DAG.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagConfig {
    pub dag_id: String,
    pub is_paused: bool,
    /// Delete the DAG from Airflow when the resource is destroyed.
    #[serde(default)]
    pub delete_dag: bool,
}

/// Observed attributes of a DAG.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagState {
    pub dag_id: String,
    pub is_paused: bool,
    pub delete_dag: bool,
    pub description: Option<String>,
    pub file_token: String,
    pub fileloc: String,
    pub is_active: bool,
    pub is_subdag: bool,
    pub root_dag_id: Option<String>,
}

impl DagState {
    /// Build from a wire DAG. `delete_dag` is not known to the server and is
    /// carried over from configuration or prior state.
    pub fn from_wire(dag: Dag, delete_dag: bool) -> Self {
        Self {
            dag_id: dag.dag_id,
            is_paused: dag.is_paused.unwrap_or(false),
            delete_dag,
            description: dag.description,
            file_token: dag.file_token,
            fileloc: dag.fileloc,
            is_active: dag.is_active.unwrap_or(false),
            is_subdag: dag.is_subdag,
            root_dag_id: dag.root_dag_id,
        }
    }
}
