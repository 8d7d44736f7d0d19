//! Request and response types for the Airflow stable REST API.
//!
//! These types mirror the server's API contract. Nullable server fields
//! are `Option`s; fields the server may omit carry `#[serde(default)]`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// DAGs
// ─────────────────────────────────────────────────────────────────────────────

/// A DAG as returned by `GET /dags/{dag_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dag {
    /// DAG identifier.
    pub dag_id: String,
    /// Parent DAG for subdags.
    #[serde(default)]
    pub root_dag_id: Option<String>,
    /// Whether the DAG is paused.
    #[serde(default)]
    pub is_paused: Option<bool>,
    /// Whether the DAG is currently seen by the scheduler.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Whether the DAG is a subdag.
    #[serde(default)]
    pub is_subdag: bool,
    /// Absolute path of the file defining the DAG.
    #[serde(default)]
    pub fileloc: String,
    /// Token used to fetch the DAG source.
    #[serde(default)]
    pub file_token: String,
    /// User-provided description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PATCH /dags/{dag_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDagRequest {
    /// Desired paused state.
    pub is_paused: bool,
}

/// Response for list DAGs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DagCollection {
    /// DAGs on this page.
    #[serde(default)]
    pub dags: Vec<Dag>,
    /// Total number of DAGs.
    #[serde(default)]
    pub total_entries: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// DAG runs
// ─────────────────────────────────────────────────────────────────────────────

/// A DAG run as returned by `GET /dags/{dag_id}/dagRuns/{dag_run_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DagRun {
    /// Run identifier, unique within the DAG.
    #[serde(default)]
    pub dag_run_id: Option<String>,
    /// Owning DAG.
    #[serde(default)]
    pub dag_id: String,
    /// Logical date of the run (ISO 8601).
    #[serde(default)]
    pub logical_date: Option<String>,
    /// Start time (ISO 8601).
    #[serde(default)]
    pub start_date: Option<String>,
    /// End time (ISO 8601).
    #[serde(default)]
    pub end_date: Option<String>,
    /// Run state label (`queued`, `running`, `success`, `failed`).
    #[serde(default)]
    pub state: Option<String>,
    /// Whether the run was triggered externally.
    #[serde(default)]
    pub external_trigger: bool,
    /// Run configuration payload.
    #[serde(default)]
    pub conf: HashMap<String, serde_json::Value>,
}

/// Body of `POST /dags/{dag_id}/dagRuns`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerDagRunRequest {
    /// Explicit run id; the server generates one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag_run_id: Option<String>,
    /// Logical date; the server uses "now" when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_date: Option<String>,
    /// Run configuration payload.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub conf: HashMap<String, serde_json::Value>,
}

/// Response for list DAG runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DagRunCollection {
    /// Runs on this page.
    #[serde(default)]
    pub dag_runs: Vec<DagRun>,
    /// Total number of runs.
    #[serde(default)]
    pub total_entries: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Variables
// ─────────────────────────────────────────────────────────────────────────────

/// A variable, used both as request body and response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable key.
    pub key: String,
    /// Variable value.
    pub value: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pools
// ─────────────────────────────────────────────────────────────────────────────

/// A pool as returned by `GET /pools/{pool_name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    /// Pool name.
    pub name: String,
    /// Total slots.
    pub slots: i32,
    /// Slots occupied by running or queued tasks.
    #[serde(default)]
    pub occupied_slots: i32,
    /// Slots used by running tasks.
    #[serde(default)]
    pub used_slots: i32,
    /// Slots used by queued tasks.
    #[serde(default)]
    pub queued_slots: i32,
    /// Free slots.
    #[serde(default)]
    pub open_slots: i32,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /pools` and `PATCH /pools/{pool_name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolRequest {
    /// Pool name.
    pub name: String,
    /// Total slots.
    pub slots: i32,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

/// A named permission action (`can_read`, `can_edit`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionName {
    /// Action name.
    pub name: String,
}

/// A named resource (`DAGs`, `Variables`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceName {
    /// Resource name.
    pub name: String,
}

/// One (action, resource) permission pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResource {
    /// Granted action.
    pub action: ActionName,
    /// Resource the action applies to.
    pub resource: ResourceName,
}

/// A role, used both as request body and response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Role name.
    pub name: String,
    /// Permissions granted by the role.
    #[serde(default)]
    pub actions: Vec<ActionResource>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

/// Status of one monitored component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// `healthy` or `unhealthy`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthInfo {
    /// Metadatabase status.
    pub metadatabase: ComponentHealth,
    /// Scheduler status.
    pub scheduler: ComponentHealth,
}

impl HealthInfo {
    /// Check if both the metadatabase and the scheduler report healthy.
    pub fn is_healthy(&self) -> bool {
        let ok = |c: &ComponentHealth| c.status.as_deref() == Some("healthy");
        ok(&self.metadatabase) && ok(&self.scheduler)
    }
}
