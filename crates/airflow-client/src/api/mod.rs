//! API endpoint implementations.

mod dag_runs;
mod dags;
mod health;
mod pools;
mod roles;
mod variables;

pub use dag_runs::{DagRunsApi, ListDagRunsQuery};
pub use dags::DagsApi;
pub use health::HealthApi;
pub use pools::PoolsApi;
pub use roles::RolesApi;
pub use variables::VariablesApi;

/// Query parameters for paginated list endpoints.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct PageQuery {
    /// Maximum number of items to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Number of items to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// `update_mask` query used by PATCH endpoints.
#[derive(Debug, serde::Serialize)]
pub(crate) struct UpdateMask<'a> {
    pub update_mask: &'a str,
}
