//! `airflow_pool`: a named slot pool.

use airflow_client::{Pool, PoolRequest};
use serde::{Deserialize, Serialize};

/// Desired attributes of a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    pub slots: i32,
    #[serde(default)]
    pub description: Option<String>,
}

impl PoolConfig {
    pub(crate) fn to_wire(&self) -> PoolRequest {
        PoolRequest {
            name: self.name.clone(),
            slots: self.slots,
            description: self.description.clone(),
        }
    }
}

/// Observed attributes of a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub name: String,
    pub slots: i32,
    pub description: Option<String>,
    pub occupied_slots: i32,
    pub used_slots: i32,
    pub queued_slots: i32,
    pub open_slots: i32,
}

impl From<Pool> for PoolState {
    fn from(p: Pool) -> Self {
        Self {
            name: p.name,
            slots: p.slots,
            description: p.description,
            occupied_slots: p.occupied_slots,
            used_slots: p.used_slots,
            queued_slots: p.queued_slots,
            open_slots: p.open_slots,
        }
    }
}
