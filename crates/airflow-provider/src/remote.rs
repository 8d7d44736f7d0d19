//! [`RunClient`] implementation backed by the Airflow REST API.

use std::collections::HashMap;

use airflow_client::{AirflowClient, DagRun, TriggerDagRunRequest};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::lifecycle::{Deletion, RunClient, RunConf, RunParams, RunProbe, RunSnapshot};
use crate::poller::RunStatus;

/// Label used when the service omits a run's state.
const MISSING_STATE: &str = "unknown";

/// Convert a run configuration to the wire form.
pub(crate) fn conf_to_wire(conf: &RunConf) -> HashMap<String, Value> {
    conf.iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Convert a wire configuration to the string map. Non-string values are
/// rendered as their JSON text.
pub(crate) fn conf_from_wire(conf: &HashMap<String, Value>) -> RunConf {
    conf.iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

impl RunSnapshot {
    /// Build a snapshot from a wire DAG run.
    pub fn from_wire(run: &DagRun) -> Result<Self> {
        let run_id = run
            .dag_run_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ProviderError::InvalidArgument(format!(
                    "DAG run of '{}' returned without a dag_run_id",
                    run.dag_id
                ))
            })?;
        Ok(Self {
            run_id,
            status: RunStatus::from(run.state.as_deref().unwrap_or(MISSING_STATE)),
            conf: conf_from_wire(&run.conf),
            logical_date: run.logical_date.clone(),
            start_date: run.start_date.clone(),
            end_date: run.end_date.clone(),
        })
    }
}

#[async_trait]
impl RunClient for AirflowClient {
    async fn start_run(&self, parent_id: &str, params: &RunParams) -> Result<String> {
        let request = TriggerDagRunRequest {
            dag_run_id: params.run_id.clone(),
            logical_date: params.logical_date.clone(),
            conf: conf_to_wire(&params.conf),
        };
        let run = self.dag_runs().trigger(parent_id, &request).await?;
        let snapshot = RunSnapshot::from_wire(&run)?;
        debug!(dag_id = parent_id, run_id = %snapshot.run_id, status = %snapshot.status, "DAG run created");
        Ok(snapshot.run_id)
    }

    async fn run_status(&self, parent_id: &str, run_id: &str) -> Result<RunProbe> {
        match self.dag_runs().get(parent_id, run_id).await {
            Ok(run) => Ok(RunProbe::Found(RunSnapshot::from_wire(&run)?)),
            Err(e) if e.is_not_found() => Ok(RunProbe::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_run(&self, parent_id: &str, run_id: &str) -> Result<Deletion> {
        match self.dag_runs().delete(parent_id, run_id).await {
            Ok(()) => Ok(Deletion::Deleted),
            Err(e) if e.is_not_found() => Ok(Deletion::AlreadyGone),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conf_round_trip_and_stringify() {
        let mut wire = HashMap::new();
        wire.insert("region".to_string(), json!("eu"));
        wire.insert("limit".to_string(), json!(10));
        wire.insert("flags".to_string(), json!({"dry_run": true}));

        let conf = conf_from_wire(&wire);
        assert_eq!(conf["region"], "eu");
        assert_eq!(conf["limit"], "10");
        assert_eq!(conf["flags"], r#"{"dry_run":true}"#);

        let back = conf_to_wire(&conf);
        assert_eq!(back["region"], json!("eu"));
        assert_eq!(back["limit"], json!("10"));
    }

    #[test]
    fn test_snapshot_requires_run_id() {
        let run = DagRun {
            dag_id: "sales_etl".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RunSnapshot::from_wire(&run),
            Err(ProviderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_snapshot_missing_state() {
        let run = DagRun {
            dag_id: "sales_etl".to_string(),
            dag_run_id: Some("run-1".to_string()),
            ..Default::default()
        };
        let snapshot = RunSnapshot::from_wire(&run).unwrap();
        assert_eq!(snapshot.status.as_str(), MISSING_STATE);
    }
}
