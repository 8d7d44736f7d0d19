//! Provider error types.

use std::time::Duration;

use thiserror::Error;

use crate::poller::RunStatus;

/// Provider-level errors.
///
/// Errors raised while waiting on a run always carry the run handle and the
/// last status observed, so a stuck run can be diagnosed from the message
/// alone.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Bad caller input (empty identifier, empty target set, forced replacement).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A run handle could not be decoded.
    #[error("unexpected format of ID ({handle}), expected DAG-ID:DAG-RUN-ID")]
    MalformedHandle { handle: String },

    /// The remote service could not be reached.
    #[error("Airflow unavailable: {0}")]
    RemoteUnavailable(#[source] airflow_client::Error),

    /// The remote service answered with an application error.
    #[error("Airflow rejected the request: {0}")]
    RemoteRejected(#[source] airflow_client::Error),

    /// The run disappeared while waiting for it.
    #[error("run {handle} not found (last observed status: {})", display_status(.last_status))]
    NotFound {
        handle: String,
        last_status: Option<RunStatus>,
    },

    /// The deadline passed before the run reached a target status.
    #[error("timeout waiting for run {handle} after {elapsed:?} (last observed status: {})", display_status(.last_status))]
    Timeout {
        handle: String,
        last_status: Option<RunStatus>,
        elapsed: Duration,
    },

    /// The caller cancelled the wait.
    #[error("wait for run {handle} cancelled (last observed status: {})", display_status(.last_status))]
    Cancelled {
        handle: String,
        last_status: Option<RunStatus>,
    },

    /// Fetching the run status failed.
    #[error("failed to get status of run {handle} (last observed status: {}): {source}", display_status(.last_status))]
    Fetch {
        handle: String,
        last_status: Option<RunStatus>,
        #[source]
        source: Box<ProviderError>,
    },

    /// The run reached a status that is neither pending nor a target.
    #[error("unexpected state '{status}' for run {handle}, wanted target {expected}")]
    UnexpectedStatus {
        handle: String,
        status: RunStatus,
        expected: String,
    },

    /// Local variable store failure.
    #[error("variable store error at '{path}': {message}")]
    Store { path: String, message: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] airflow_config::ConfigError),
}

fn display_status(status: &Option<RunStatus>) -> String {
    status
        .as_ref()
        .map(|s| format!("'{}'", s))
        .unwrap_or_else(|| "none".to_string())
}

impl ProviderError {
    /// Check if the run disappeared remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    /// Check if the deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }

    /// Check if the caller cancelled the wait.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled { .. })
    }

    /// Last status observed before a wait failed, if any.
    pub fn last_status(&self) -> Option<&RunStatus> {
        match self {
            ProviderError::UnexpectedStatus { status, .. } => Some(status),
            ProviderError::Timeout { last_status, .. }
            | ProviderError::NotFound { last_status, .. }
            | ProviderError::Cancelled { last_status, .. }
            | ProviderError::Fetch { last_status, .. } => last_status.as_ref(),
            _ => None,
        }
    }
}

impl From<airflow_client::Error> for ProviderError {
    fn from(err: airflow_client::Error) -> Self {
        match err {
            airflow_client::Error::Config(msg) => ProviderError::InvalidArgument(msg),
            err if err.is_transport() => ProviderError::RemoteUnavailable(err),
            err => ProviderError::RemoteRejected(err),
        }
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
