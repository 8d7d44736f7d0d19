//! Run handle codec.
//!
//! A run handle is the externally visible identity of a DAG run:
//! `"<dag_id>:<dag_run_id>"`. Decoding splits on the first `:` only, so run
//! ids such as `manual__2024-01-01T00:00:00+00:00` survive a round trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ProviderError, Result};

/// Separator between the DAG id and the run id.
pub const SEPARATOR: char = ':';

/// Composite identifier of a run: parent id plus run id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunHandle {
    parent_id: String,
    run_id: String,
}

impl RunHandle {
    /// Build a handle from its parts.
    ///
    /// Fails with `InvalidArgument` if either part is empty, or if the parent
    /// id contains the separator (it could not be decoded back).
    pub fn encode(parent_id: impl Into<String>, run_id: impl Into<String>) -> Result<Self> {
        let parent_id = parent_id.into();
        let run_id = run_id.into();
        Self::validate_parent(&parent_id)?;
        if run_id.is_empty() {
            return Err(ProviderError::InvalidArgument(
                "DAG run id must not be empty".to_string(),
            ));
        }
        Ok(Self { parent_id, run_id })
    }

    /// Check that `parent_id` can appear in a handle. Call this before
    /// creating anything remotely, so a run is never started under an id
    /// that could not be reported back.
    pub fn validate_parent(parent_id: &str) -> Result<()> {
        if parent_id.is_empty() {
            return Err(ProviderError::InvalidArgument(
                "DAG id must not be empty".to_string(),
            ));
        }
        if parent_id.contains(SEPARATOR) {
            return Err(ProviderError::InvalidArgument(format!(
                "DAG id '{}' must not contain '{}'",
                parent_id, SEPARATOR
            )));
        }
        Ok(())
    }

    /// Parse a handle, failing with `MalformedHandle` if the separator is
    /// missing or either side is empty.
    pub fn decode(handle: &str) -> Result<Self> {
        match handle.split_once(SEPARATOR) {
            Some((parent, run)) if !parent.is_empty() && !run.is_empty() => Ok(Self {
                parent_id: parent.to_string(),
                run_id: run.to_string(),
            }),
            _ => Err(ProviderError::MalformedHandle {
                handle: handle.to_string(),
            }),
        }
    }

    /// The DAG id.
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// The DAG run id.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Split into `(parent_id, run_id)`.
    pub fn into_parts(self) -> (String, String) {
        (self.parent_id, self.run_id)
    }
}

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.parent_id, SEPARATOR, self.run_id)
    }
}

impl FromStr for RunHandle {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl Serialize for RunHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RunHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::decode(&raw).map_err(serde::de::Error::custom)
    }
}
