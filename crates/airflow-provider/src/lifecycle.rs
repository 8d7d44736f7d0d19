//! Run lifecycle controller.
//!
//! [`RunLifecycle`] starts a run through a [`RunClient`], builds its
//! [`RunHandle`], and drives a [`StatePoller`] until the run settles.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{ProviderError, Result};
use crate::handle::RunHandle;
use crate::poller::{
    DEFAULT_POLL_INTERVAL, RunStatus, StatePoller, StatusProbe, StatusSet, UnknownStatus,
    status_set,
};

/// Default time to wait for a triggered run.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Configuration payload passed to a triggered run.
pub type RunConf = BTreeMap<String, String>;

/// Parameters of a run to start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunParams {
    /// Explicit run id; the service generates one when absent.
    pub run_id: Option<String>,
    /// Logical date (ISO 8601); the service uses "now" when absent.
    pub logical_date: Option<String>,
    /// Run configuration.
    pub conf: RunConf,
}

impl RunParams {
    /// Parameters carrying only a configuration payload.
    pub fn with_conf(conf: RunConf) -> Self {
        Self {
            conf,
            ..Default::default()
        }
    }
}

/// Everything observed about a run in one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    /// Run id.
    pub run_id: String,
    /// Current status.
    pub status: RunStatus,
    /// Configuration the run was started with.
    pub conf: RunConf,
    /// Logical date.
    pub logical_date: Option<String>,
    /// Start time.
    pub start_date: Option<String>,
    /// End time.
    pub end_date: Option<String>,
}

/// Result of fetching a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunProbe {
    /// The run exists.
    Found(RunSnapshot),
    /// The run record is gone.
    NotFound,
}

/// Result of deleting a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The run was deleted by this call.
    Deleted,
    /// The run did not exist.
    AlreadyGone,
}

/// Remote operations on runs.
#[async_trait]
pub trait RunClient: Send + Sync {
    /// Start a run of `parent_id` and return the new run id.
    async fn start_run(&self, parent_id: &str, params: &RunParams) -> Result<String>;

    /// Fetch a run. A missing run is `RunProbe::NotFound`, not an error.
    async fn run_status(&self, parent_id: &str, run_id: &str) -> Result<RunProbe>;

    /// Delete a run. A missing run is `Deletion::AlreadyGone`, not an error.
    async fn delete_run(&self, parent_id: &str, run_id: &str) -> Result<Deletion>;
}

/// Which statuses to wait through and for, and for how long.
#[derive(Debug, Clone)]
pub struct WaitSpec {
    /// Statuses that keep the wait going.
    pub pending: StatusSet,
    /// Statuses that end the wait successfully.
    pub target: StatusSet,
    /// Time budget, measured from the start of the wait.
    pub timeout: Duration,
    /// Treatment of statuses in neither set.
    pub unknown: UnknownStatus,
}

impl WaitSpec {
    /// Wait spec with explicit sets and the default unknown-status policy.
    pub fn new(pending: StatusSet, target: StatusSet, timeout: Duration) -> Self {
        Self {
            pending,
            target,
            timeout,
            unknown: UnknownStatus::default(),
        }
    }

    /// Override the time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for WaitSpec {
    /// Airflow DAG runs: wait through `queued`/`running` for `success`.
    fn default() -> Self {
        Self::new(
            status_set(["queued", "running"]),
            status_set(["success"]),
            DEFAULT_WAIT_TIMEOUT,
        )
    }
}

/// Outcome of [`RunLifecycle::trigger`] once the run exists.
///
/// The handle is reported even when waiting failed, because the remote run
/// was created regardless.
#[derive(Debug)]
pub struct TriggerOutcome {
    /// Handle of the created run.
    pub handle: RunHandle,
    /// Final status, or why waiting for it failed.
    pub result: Result<RunStatus>,
}

impl TriggerOutcome {
    /// Collapse into a plain result, dropping the handle on failure.
    pub fn into_result(self) -> Result<(RunHandle, RunStatus)> {
        let handle = self.handle;
        self.result.map(|status| (handle, status))
    }
}

/// Drives runs from start to a terminal status.
pub struct RunLifecycle<C> {
    client: C,
    interval: Duration,
    cancel: CancellationToken,
}

impl<C: RunClient> RunLifecycle<C> {
    /// Create a controller with the default poll interval.
    pub fn new(client: C) -> Self {
        Self {
            client,
            interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts any wait in progress when cancelled.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Start a run and wait for it to reach a target status.
    ///
    /// Returns `Err` only if the run could not be started (or the wait spec
    /// is invalid); once the run exists, the wait result is reported inside
    /// the [`TriggerOutcome`] alongside the handle.
    pub async fn trigger(
        &self,
        parent_id: &str,
        params: RunParams,
        wait: &WaitSpec,
    ) -> Result<TriggerOutcome> {
        RunHandle::validate_parent(parent_id)?;
        if params.run_id.as_deref() == Some("") {
            return Err(ProviderError::InvalidArgument(
                "DAG run id must not be empty when set".to_string(),
            ));
        }
        let poller = self.poller(wait)?;

        let run_id = self.client.start_run(parent_id, &params).await?;
        let handle = RunHandle::encode(parent_id, run_id)?;
        info!(%handle, "run started");

        let result = self.wait_with(&poller, &handle, wait.timeout).await;
        Ok(TriggerOutcome { handle, result })
    }

    /// Wait for an existing run to reach a target status.
    pub async fn wait(&self, handle: &RunHandle, wait: &WaitSpec) -> Result<RunStatus> {
        let poller = self.poller(wait)?;
        self.wait_with(&poller, handle, wait.timeout).await
    }

    /// Fetch the current state of a run once, without polling.
    ///
    /// Returns `Ok(None)` if the run is gone, so callers can treat it as
    /// deleted.
    pub async fn reconcile(&self, handle: &RunHandle) -> Result<Option<RunSnapshot>> {
        match self
            .client
            .run_status(handle.parent_id(), handle.run_id())
            .await?
        {
            RunProbe::Found(snapshot) => Ok(Some(snapshot)),
            RunProbe::NotFound => {
                warn!(%handle, "run not found, treating as deleted");
                Ok(None)
            }
        }
    }

    /// Delete a run; a run that is already gone counts as deleted.
    pub async fn delete(&self, handle: &RunHandle) -> Result<Deletion> {
        let deletion = self
            .client
            .delete_run(handle.parent_id(), handle.run_id())
            .await?;
        info!(%handle, ?deletion, "run deleted");
        Ok(deletion)
    }

    fn poller(&self, wait: &WaitSpec) -> Result<StatePoller> {
        Ok(StatePoller::new(wait.pending.clone(), wait.target.clone())?
            .with_interval(self.interval)
            .with_unknown_status(wait.unknown))
    }

    async fn wait_with(
        &self,
        poller: &StatePoller,
        handle: &RunHandle,
        timeout: Duration,
    ) -> Result<RunStatus> {
        let deadline = Instant::now() + timeout;
        poller
            .poll(handle, deadline, &self.cancel, || self.fetch_status(handle))
            .await
    }

    async fn fetch_status(&self, handle: &RunHandle) -> Result<StatusProbe> {
        let probe = self
            .client
            .run_status(handle.parent_id(), handle.run_id())
            .await?;
        Ok(match probe {
            RunProbe::Found(snapshot) => StatusProbe::Found(snapshot.status),
            RunProbe::NotFound => StatusProbe::NotFound,
        })
    }
}
