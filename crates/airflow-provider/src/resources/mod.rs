//! Declarative resource surface.
//!
//! Every managed Airflow object is a [`ResourceKind`] with a desired-state
//! `*Config` and an observed `*State`. The sum types [`ResourceConfig`] and
//! [`ResourceState`] let [`crate::Provider`] dispatch on kind.

mod dag;
mod dag_run;
mod pool;
mod role;
mod variable;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

pub use dag::{DagConfig, DagState};
pub use dag_run::{DagRunConfig, DagRunState};
pub use pool::{PoolConfig, PoolState};
pub use role::{Permission, RoleConfig, RoleState};
pub use variable::{VariableConfig, VariableState};

/// Kinds of managed objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "airflow_dag")]
    Dag,
    #[serde(rename = "airflow_dag_run")]
    DagRun,
    #[serde(rename = "airflow_variable")]
    Variable,
    #[serde(rename = "airflow_pool")]
    Pool,
    #[serde(rename = "airflow_role")]
    Role,
}

impl ResourceKind {
    /// All kinds, in declaration order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Dag,
        ResourceKind::DagRun,
        ResourceKind::Variable,
        ResourceKind::Pool,
        ResourceKind::Role,
    ];

    /// Type name as used in declarative configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Dag => "airflow_dag",
            ResourceKind::DagRun => "airflow_dag_run",
            ResourceKind::Variable => "airflow_variable",
            ResourceKind::Pool => "airflow_pool",
            ResourceKind::Role => "airflow_role",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProviderError::InvalidArgument(format!("unknown resource type '{}'", s)))
    }
}

/// Desired attributes of any resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceConfig {
    #[serde(rename = "airflow_dag")]
    Dag(DagConfig),
    #[serde(rename = "airflow_dag_run")]
    DagRun(DagRunConfig),
    #[serde(rename = "airflow_variable")]
    Variable(VariableConfig),
    #[serde(rename = "airflow_pool")]
    Pool(PoolConfig),
    #[serde(rename = "airflow_role")]
    Role(RoleConfig),
}

impl ResourceConfig {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceConfig::Dag(_) => ResourceKind::Dag,
            ResourceConfig::DagRun(_) => ResourceKind::DagRun,
            ResourceConfig::Variable(_) => ResourceKind::Variable,
            ResourceConfig::Pool(_) => ResourceKind::Pool,
            ResourceConfig::Role(_) => ResourceKind::Role,
        }
    }
}

/// Observed attributes of any resource, including computed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceState {
    #[serde(rename = "airflow_dag")]
    Dag(DagState),
    #[serde(rename = "airflow_dag_run")]
    DagRun(DagRunState),
    #[serde(rename = "airflow_variable")]
    Variable(VariableState),
    #[serde(rename = "airflow_pool")]
    Pool(PoolState),
    #[serde(rename = "airflow_role")]
    Role(RoleState),
}

impl ResourceState {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceState::Dag(_) => ResourceKind::Dag,
            ResourceState::DagRun(_) => ResourceKind::DagRun,
            ResourceState::Variable(_) => ResourceKind::Variable,
            ResourceState::Pool(_) => ResourceKind::Pool,
            ResourceState::Role(_) => ResourceKind::Role,
        }
    }

    /// Identifier of the resource within its kind.
    pub fn id(&self) -> String {
        match self {
            ResourceState::Dag(s) => s.dag_id.clone(),
            ResourceState::DagRun(s) => s.handle.to_string(),
            ResourceState::Variable(s) => s.key.clone(),
            ResourceState::Pool(s) => s.name.clone(),
            ResourceState::Role(s) => s.name.clone(),
        }
    }
}

/// Reject an update whose replacement-forcing attribute differs from the id.
pub(crate) fn ensure_same_id(
    kind: ResourceKind,
    attr: &str,
    id: &str,
    desired: &str,
) -> crate::Result<()> {
    if id == desired {
        Ok(())
    } else {
        Err(ProviderError::InvalidArgument(format!(
            "{} '{}': changing {} to '{}' requires replacement",
            kind, id, attr, desired
        )))
    }
}
