//! Resource dispatcher.
//!
//! [`Provider`] maps declarative operations (create, read, update, delete,
//! import) on each [`ResourceKind`] to Airflow API calls. `read` returning
//! `None` means the object is gone and should be dropped from state; delete
//! of a missing object succeeds.

use std::time::Duration;

use airflow_client::AirflowClient;
use airflow_config::{Credentials, ResolvedConfig, VariableBackend};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, Result};
use crate::handle::RunHandle;
use crate::lifecycle::{RunLifecycle, WaitSpec};
use crate::resources::{
    DagConfig, DagRunConfig, DagRunState, DagState, PoolState, ResourceConfig, ResourceKind,
    ResourceState, RoleState, VariableConfig, VariableState, ensure_same_id,
};
use crate::store::{FileVariableStore, LocalVariables, VariableStore};

/// Where `airflow_variable` resources live.
enum Variables {
    Remote,
    Local(LocalVariables<Box<dyn VariableStore>>),
}

/// Entry point for managing Airflow objects.
pub struct Provider {
    client: AirflowClient,
    runs: RunLifecycle<AirflowClient>,
    wait: WaitSpec,
    variables: Variables,
}

impl Provider {
    /// Provider over an existing client, with default poll interval and wait
    /// spec, and remote variables.
    pub fn new(client: AirflowClient) -> Self {
        Self {
            runs: RunLifecycle::new(client.clone()),
            client,
            wait: WaitSpec::default(),
            variables: Variables::Remote,
        }
    }

    /// Build the client and controller from resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let builder = AirflowClient::builder()
            .base_url(config.base_endpoint.as_str())
            .api_path(config.api_path.clone())
            .timeout(config.request_timeout);
        let builder = match &config.credentials {
            Credentials::None => builder,
            Credentials::Bearer(token) => builder.bearer_token(token.clone()),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username.clone(), password.clone())
            }
        };
        let client = builder.build()?;

        let mut provider = Self::new(client)
            .with_poll_interval(config.poll_interval)
            .with_wait_spec(WaitSpec::default().with_timeout(config.create_timeout));
        if config.variable_backend == VariableBackend::Local {
            debug!(path = %config.variables_file.display(), "using local variable store");
            provider =
                provider.with_variable_store(FileVariableStore::new(&config.variables_file));
        }
        Ok(provider)
    }

    /// Set the DAG run poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.runs = self.runs.with_interval(interval);
        self
    }

    /// Set the wait spec used when creating DAG runs.
    pub fn with_wait_spec(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    /// Keep variables in a local store instead of the remote API.
    pub fn with_variable_store(mut self, store: impl VariableStore + 'static) -> Self {
        let store: Box<dyn VariableStore> = Box::new(store);
        self.variables = Variables::Local(LocalVariables::new(store));
        self
    }

    /// Abort DAG run waits when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.runs = self.runs.with_cancellation(cancel);
        self
    }

    /// The underlying Airflow client.
    pub fn client(&self) -> &AirflowClient {
        &self.client
    }

    /// The DAG run lifecycle controller.
    pub fn lifecycle(&self) -> &RunLifecycle<AirflowClient> {
        &self.runs
    }

    /// Wait spec applied when creating DAG runs.
    pub fn wait_spec(&self) -> &WaitSpec {
        &self.wait
    }

    /// Whether variables are kept in a local store.
    pub fn uses_local_variables(&self) -> bool {
        matches!(self.variables, Variables::Local(_))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a resource and return its observed state.
    ///
    /// For DAG runs this triggers the run and waits for it to succeed.
    pub async fn create(&self, config: &ResourceConfig) -> Result<ResourceState> {
        match config {
            ResourceConfig::Dag(c) => self.apply_dag(c).await.map(ResourceState::Dag),
            ResourceConfig::DagRun(c) => self.create_dag_run(c).await.map(ResourceState::DagRun),
            ResourceConfig::Variable(c) => {
                self.write_variable(c, false).await.map(ResourceState::Variable)
            }
            ResourceConfig::Pool(c) => {
                require("pool name", &c.name)?;
                let pool = self.client.pools().create(&c.to_wire()).await?;
                Ok(ResourceState::Pool(PoolState::from(pool)))
            }
            ResourceConfig::Role(c) => {
                require("role name", &c.name)?;
                let role = self.client.roles().create(&c.to_wire()).await?;
                Ok(ResourceState::Role(RoleState::from(role)))
            }
        }
    }

    /// Read a resource by id. `None` means it no longer exists.
    pub async fn read(&self, kind: ResourceKind, id: &str) -> Result<Option<ResourceState>> {
        let state = match kind {
            ResourceKind::Dag => found(self.client.dags().get(id).await)?
                .map(|dag| ResourceState::Dag(DagState::from_wire(dag, false))),
            ResourceKind::DagRun => {
                let handle = RunHandle::decode(id)?;
                let snapshot = self.runs.reconcile(&handle).await?;
                snapshot.map(|s| ResourceState::DagRun(DagRunState::from_snapshot(handle, s)))
            }
            ResourceKind::Variable => self.read_variable(id).await?.map(ResourceState::Variable),
            ResourceKind::Pool => found(self.client.pools().get(id).await)?
                .map(|pool| ResourceState::Pool(PoolState::from(pool))),
            ResourceKind::Role => found(self.client.roles().get(id).await)?
                .map(|role| ResourceState::Role(RoleState::from(role))),
        };
        if state.is_none() {
            info!(kind = %kind, id, "resource not found, dropping from state");
        }
        Ok(state)
    }

    /// Re-read a resource, carrying over attributes the server does not
    /// store (such as `delete_dag`).
    pub async fn refresh(&self, prior: &ResourceState) -> Result<Option<ResourceState>> {
        let state = self.read(prior.kind(), &prior.id()).await?;
        Ok(match (prior, state) {
            (ResourceState::Dag(old), Some(ResourceState::Dag(mut new))) => {
                new.delete_dag = old.delete_dag;
                Some(ResourceState::Dag(new))
            }
            (_, state) => state,
        })
    }

    /// Bring an existing object under management.
    pub async fn import(&self, kind: ResourceKind, id: &str) -> Result<ResourceState> {
        self.read(kind, id).await?.ok_or_else(|| {
            ProviderError::InvalidArgument(format!("cannot import {} '{}': not found", kind, id))
        })
    }

    /// Update a resource in place.
    ///
    /// Changing the identifying attribute, or any attribute of a DAG run,
    /// requires replacement and is rejected with `InvalidArgument`.
    pub async fn update(&self, id: &str, config: &ResourceConfig) -> Result<ResourceState> {
        match config {
            ResourceConfig::Dag(c) => {
                ensure_same_id(ResourceKind::Dag, "dag_id", id, &c.dag_id)?;
                self.apply_dag(c).await.map(ResourceState::Dag)
            }
            ResourceConfig::DagRun(_) => Err(ProviderError::InvalidArgument(format!(
                "{} '{}' cannot be updated in place; all attributes require replacement",
                ResourceKind::DagRun,
                id
            ))),
            ResourceConfig::Variable(c) => {
                ensure_same_id(ResourceKind::Variable, "key", id, &c.key)?;
                self.write_variable(c, true).await.map(ResourceState::Variable)
            }
            ResourceConfig::Pool(c) => {
                ensure_same_id(ResourceKind::Pool, "name", id, &c.name)?;
                let pool = self.client.pools().update(id, &c.to_wire()).await?;
                Ok(ResourceState::Pool(PoolState::from(pool)))
            }
            ResourceConfig::Role(c) => {
                ensure_same_id(ResourceKind::Role, "name", id, &c.name)?;
                let role = self.client.roles().update(id, &c.to_wire()).await?;
                Ok(ResourceState::Role(RoleState::from(role)))
            }
        }
    }

    /// Delete a resource. An object that is already gone counts as deleted.
    ///
    /// DAGs are only deleted when `delete_dag` is set; otherwise they are
    /// released from management and left in place.
    pub async fn delete(&self, state: &ResourceState) -> Result<()> {
        match state {
            ResourceState::Dag(s) if s.delete_dag => {
                gone_ok(self.client.dags().delete(&s.dag_id).await)?
            }
            ResourceState::Dag(s) => {
                debug!(dag_id = %s.dag_id, "delete_dag not set, leaving DAG in place");
            }
            ResourceState::DagRun(s) => {
                self.runs.delete(&s.handle).await?;
            }
            ResourceState::Variable(s) => match &self.variables {
                Variables::Remote => gone_ok(self.client.variables().delete(&s.key).await)?,
                Variables::Local(local) => {
                    local.remove(&s.key)?;
                }
            },
            ResourceState::Pool(s) => gone_ok(self.client.pools().delete(&s.name).await)?,
            ResourceState::Role(s) => gone_ok(self.client.roles().delete(&s.name).await)?,
        }
        info!(kind = %state.kind(), id = %state.id(), "resource deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Per-kind helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn apply_dag(&self, config: &DagConfig) -> Result<DagState> {
        require("dag_id", &config.dag_id)?;
        let dag = self
            .client
            .dags()
            .set_paused(&config.dag_id, config.is_paused)
            .await?;
        Ok(DagState::from_wire(dag, config.delete_dag))
    }

    async fn create_dag_run(&self, config: &DagRunConfig) -> Result<DagRunState> {
        let outcome = self
            .runs
            .trigger(&config.dag_id, config.to_params(), &self.wait)
            .await?;
        let handle = outcome.handle;
        let status = match outcome.result {
            Ok(status) => status,
            Err(e) => {
                warn!(%handle, error = %e, "DAG run did not finish");
                return Err(e);
            }
        };

        match self.runs.reconcile(&handle).await? {
            Some(snapshot) => Ok(DagRunState::from_snapshot(handle, snapshot)),
            None => Err(ProviderError::NotFound {
                handle: handle.to_string(),
                last_status: Some(status),
            }),
        }
    }

    async fn read_variable(&self, key: &str) -> Result<Option<VariableState>> {
        match &self.variables {
            Variables::Remote => {
                let variable = found(self.client.variables().get(key).await)?;
                Ok(variable.map(VariableState::from))
            }
            Variables::Local(local) => Ok(local.get(key)?.map(|value| VariableState {
                key: key.to_string(),
                value,
                description: None,
            })),
        }
    }

    async fn write_variable(&self, config: &VariableConfig, exists: bool) -> Result<VariableState> {
        require("variable key", &config.key)?;
        match &self.variables {
            Variables::Remote => {
                let api = self.client.variables();
                let variable = if exists {
                    api.update(&config.key, &config.to_wire()).await?
                } else {
                    api.create(&config.to_wire()).await?
                };
                Ok(VariableState::from(variable))
            }
            // Descriptions are not persisted locally.
            Variables::Local(local) => {
                local.set(&config.key, &config.value)?;
                Ok(VariableState {
                    key: config.key.clone(),
                    value: config.value.clone(),
                    description: None,
                })
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(ProviderError::InvalidArgument(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

/// Map a 404 to `None`.
fn found<T>(result: airflow_client::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Treat a 404 on delete as success.
fn gone_ok(result: airflow_client::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{PoolConfig, RoleConfig};
    use crate::store::MemoryVariableStore;

    fn offline_provider() -> Provider {
        let client = AirflowClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        Provider::new(client)
    }

    #[tokio::test]
    async fn test_dag_run_update_is_rejected() {
        let provider = offline_provider();
        let config = ResourceConfig::DagRun(DagRunConfig {
            dag_id: "sales_etl".to_string(),
            ..Default::default()
        });
        let err = provider.update("sales_etl:run-1", &config).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_renames() {
        let provider = offline_provider();
        let config = ResourceConfig::Pool(PoolConfig {
            name: "other".to_string(),
            slots: 1,
            description: None,
        });
        let err = provider.update("etl", &config).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));

        let config = ResourceConfig::Role(RoleConfig {
            name: "other".to_string(),
            ..Default::default()
        });
        assert!(provider.update("ops", &config).await.is_err());
    }

    #[tokio::test]
    async fn test_read_dag_run_rejects_malformed_handle() {
        let provider = offline_provider();
        let err = provider.read(ResourceKind::DagRun, "no-separator").await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedHandle { .. }));
    }

    #[tokio::test]
    async fn test_dag_without_delete_flag_is_left_alone() {
        // Any request would fail against the offline endpoint.
        let provider = offline_provider();
        let state = ResourceState::Dag(DagState {
            dag_id: "sales_etl".to_string(),
            ..Default::default()
        });
        provider.delete(&state).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_variables_round_trip() {
        let provider = offline_provider().with_variable_store(MemoryVariableStore::default());
        assert!(provider.uses_local_variables());

        let config = VariableConfig {
            key: "region".to_string(),
            value: "eu".to_string(),
            description: Some("ignored locally".to_string()),
        };
        let created = provider
            .create(&ResourceConfig::Variable(config.clone()))
            .await
            .unwrap();
        assert_eq!(created.id(), "region");

        let read = provider.read(ResourceKind::Variable, "region").await.unwrap();
        assert_eq!(
            read,
            Some(ResourceState::Variable(VariableState {
                key: "region".to_string(),
                value: "eu".to_string(),
                description: None,
            }))
        );

        let updated = VariableConfig {
            value: "us".to_string(),
            ..config
        };
        provider
            .update("region", &ResourceConfig::Variable(updated))
            .await
            .unwrap();

        let state = provider.import(ResourceKind::Variable, "region").await.unwrap();
        assert!(matches!(&state, ResourceState::Variable(v) if v.value == "us"));

        provider.delete(&state).await.unwrap();
        provider.delete(&state).await.unwrap();
        assert_eq!(provider.read(ResourceKind::Variable, "region").await.unwrap(), None);
        assert!(provider.import(ResourceKind::Variable, "region").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_identifiers_are_rejected() {
        let provider = offline_provider().with_variable_store(MemoryVariableStore::default());
        let config = ResourceConfig::Variable(VariableConfig::default());
        let err = provider.create(&config).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
    }
}
