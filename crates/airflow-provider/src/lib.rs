//! Declarative management of Apache Airflow objects.
//!
//! The core is the DAG run lifecycle:
//!
//! - [`RunHandle`]: `"<dag_id>:<dag_run_id>"` codec
//! - [`StatePoller`]: waits for a run to move from a pending status to a
//!   target status, within a deadline, honouring cancellation
//! - [`RunLifecycle`]: trigger, wait, reconcile and delete runs through any
//!   [`RunClient`]
//!
//! Around it sits [`Provider`], which maps create/read/update/delete/import
//! of each [`ResourceKind`] onto the Airflow REST API, and a local
//! [`VariableStore`] that can stand in for remote variables.
//!
//! ```no_run
//! use airflow_provider::{RunLifecycle, RunParams, WaitSpec};
//!
//! # async fn example(client: airflow_client::AirflowClient) -> airflow_provider::Result<()> {
//! let runs = RunLifecycle::new(client);
//! let outcome = runs
//!     .trigger("sales_etl", RunParams::default(), &WaitSpec::default())
//!     .await?;
//! println!("{} -> {:?}", outcome.handle, outcome.result);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handle;
pub mod lifecycle;
pub mod poller;
pub mod provider;
pub mod remote;
pub mod resources;
pub mod store;

pub use error::{ProviderError, Result};
pub use handle::RunHandle;
pub use lifecycle::{
    DEFAULT_WAIT_TIMEOUT, Deletion, RunClient, RunConf, RunLifecycle, RunParams, RunProbe,
    RunSnapshot, TriggerOutcome, WaitSpec,
};
pub use poller::{
    DEFAULT_POLL_INTERVAL, RunStatus, StatePoller, StatusProbe, StatusSet, UnknownStatus,
    status_set,
};
pub use provider::Provider;
pub use resources::{
    DagConfig, DagRunConfig, DagRunState, DagState, Permission, PoolConfig, PoolState,
    ResourceConfig, ResourceKind, ResourceState, RoleConfig, RoleState, VariableConfig,
    VariableState,
};
pub use store::{FileVariableStore, LocalVariables, MemoryVariableStore, VariableStore, Variables};
