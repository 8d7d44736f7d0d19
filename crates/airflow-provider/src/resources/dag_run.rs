//! `airflow_dag_run`: a triggered run, identified by its handle.

use serde::{Deserialize, Serialize};

use crate::handle::RunHandle;
use crate::lifecycle::{RunConf, RunParams, RunSnapshot};

/// Desired attributes of a DAG run. Every attribute forces replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagRunConfig {
    pub dag_id: String,
    /// Explicit run id; generated by Airflow when absent.
    #[serde(default)]
    pub dag_run_id: Option<String>,
    #[serde(default)]
    pub conf: RunConf,
}

impl DagRunConfig {
    pub(crate) fn to_params(&self) -> RunParams {
        RunParams {
            run_id: self.dag_run_id.clone(),
            logical_date: None,
            conf: self.conf.clone(),
        }
    }
}

/// Observed attributes of a DAG run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagRunState {
    pub handle: RunHandle,
    pub dag_id: String,
    pub dag_run_id: String,
    pub conf: RunConf,
    pub state: String,
    pub logical_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DagRunState {
    pub fn from_snapshot(handle: RunHandle, snapshot: RunSnapshot) -> Self {
        Self {
            dag_id: handle.parent_id().to_string(),
            dag_run_id: snapshot.run_id,
            handle,
            conf: snapshot.conf,
            state: snapshot.status.to_string(),
            logical_date: snapshot.logical_date,
            start_date: snapshot.start_date,
            end_date: snapshot.end_date,
        }
    }
}
