//! Configuration types.
//!
//! [`ProviderConfig`] is the raw, layerable form read from files and the
//! environment: every field is optional so later layers only override what
//! they set. [`ProviderConfig::resolve`] validates it into a
//! [`ResolvedConfig`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::env::{ENV_BASE_ENDPOINT, ENV_OAUTH2_TOKEN, ENV_PASSWORD, ENV_USERNAME};
use crate::{ConfigError, Result};

/// Default API prefix of the Airflow stable REST API.
pub const DEFAULT_API_PATH: &str = "api/v1";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default interval between DAG run status polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default time to wait for a triggered DAG run to succeed.
pub const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 10 * 60;

/// File name of the local variable store.
pub const DEFAULT_VARIABLES_FILE: &str = "airflow_variables.json";

// ─────────────────────────────────────────────────────────────────────────────
// Raw config
// ─────────────────────────────────────────────────────────────────────────────

/// Root provider configuration, as written in `airflow-provider.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the Airflow webserver.
    #[serde(default)]
    pub base_endpoint: Option<String>,

    /// OAuth2 access token sent as a bearer token.
    #[serde(default)]
    pub oauth2_token: Option<String>,

    /// Basic-auth user name.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,

    /// API prefix appended to the base endpoint.
    #[serde(default)]
    pub api_path: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Where `airflow_variable` resources are stored.
    #[serde(default)]
    pub variable_backend: Option<VariableBackend>,

    /// Path of the local variable file (local backend only).
    #[serde(default)]
    pub variables_file: Option<PathBuf>,

    /// DAG run wait settings.
    #[serde(default)]
    pub dag_run: Option<DagRunConfig>,
}

/// `[dag_run]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DagRunConfig {
    /// Seconds between status polls.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,

    /// Seconds to wait for a triggered run before giving up.
    #[serde(default)]
    pub create_timeout_secs: Option<u64>,
}

/// Storage backend for variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableBackend {
    /// Airflow's `/variables` API.
    #[default]
    Remote,
    /// A JSON file in the working directory.
    Local,
}

impl ProviderConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Set the base endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.base_endpoint = Some(endpoint.into());
        self
    }

    /// Merge another layer into this one; fields set in `other` win.
    pub fn merge(&mut self, other: ProviderConfig) {
        if other.base_endpoint.is_some() {
            self.base_endpoint = other.base_endpoint;
        }
        if other.oauth2_token.is_some() {
            self.oauth2_token = other.oauth2_token;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.api_path.is_some() {
            self.api_path = other.api_path;
        }
        if other.request_timeout_secs.is_some() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.variable_backend.is_some() {
            self.variable_backend = other.variable_backend;
        }
        if other.variables_file.is_some() {
            self.variables_file = other.variables_file;
        }
        if let Some(dag_run) = other.dag_run {
            let current = self.dag_run.get_or_insert_with(DagRunConfig::default);
            if dag_run.poll_interval_secs.is_some() {
                current.poll_interval_secs = dag_run.poll_interval_secs;
            }
            if dag_run.create_timeout_secs.is_some() {
                current.create_timeout_secs = dag_run.create_timeout_secs;
            }
        }
    }

    /// Check whether this layer carries secrets in plaintext.
    pub fn has_plaintext_secret(&self) -> bool {
        self.oauth2_token.is_some() || self.password.is_some()
    }

    /// Validate and resolve into a usable configuration.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let endpoint = self
            .base_endpoint
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingField {
                field: "base_endpoint".to_string(),
                env_var: ENV_BASE_ENDPOINT.to_string(),
            })?;
        let base_endpoint = parse_endpoint(endpoint)?;

        let credentials = resolve_credentials(
            non_empty(&self.oauth2_token),
            non_empty(&self.username),
            non_empty(&self.password),
        )?;

        let dag_run = self.dag_run.clone().unwrap_or_default();
        let poll_interval_secs = dag_run
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dag_run.poll_interval_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(ResolvedConfig {
            base_endpoint,
            credentials,
            api_path: self
                .api_path
                .clone()
                .unwrap_or_else(|| DEFAULT_API_PATH.to_string()),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            poll_interval: Duration::from_secs(poll_interval_secs),
            create_timeout: Duration::from_secs(
                dag_run
                    .create_timeout_secs
                    .unwrap_or(DEFAULT_CREATE_TIMEOUT_SECS),
            ),
            variable_backend: self.variable_backend.unwrap_or_default(),
            variables_file: self
                .variables_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VARIABLES_FILE)),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolved config
// ─────────────────────────────────────────────────────────────────────────────

/// Credentials attached to API requests. At most one kind is ever set.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Unauthenticated access.
    None,
    /// OAuth2 bearer token.
    Bearer(String),
    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::None => write!(f, "None"),
            Credentials::Bearer(_) => write!(f, "Bearer(***)"),
            Credentials::Basic { username, .. } => write!(f, "Basic({}:***)", username),
        }
    }
}

/// Validated configuration with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Base URL of the Airflow webserver.
    pub base_endpoint: Url,
    /// Request credentials.
    pub credentials: Credentials,
    /// API prefix.
    pub api_path: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Interval between DAG run status polls.
    pub poll_interval: Duration,
    /// Time to wait for a triggered run.
    pub create_timeout: Duration,
    /// Variable storage backend.
    pub variable_backend: VariableBackend,
    /// Local variable file (relative paths resolve against the working directory).
    pub variables_file: PathBuf,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_endpoint(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            value: value.to_string(),
            reason: "expected an http or https URL".to_string(),
        });
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEndpoint {
            value: value.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}

fn resolve_credentials(
    token: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Credentials> {
    match (token, username, password) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ConfigError::ConflictingAuth(format!(
            "oauth2_token ({}) conflicts with username/password ({}/{})",
            ENV_OAUTH2_TOKEN, ENV_USERNAME, ENV_PASSWORD
        ))),
        (Some(token), None, None) => Ok(Credentials::Bearer(token.to_string())),
        (None, Some(_), None) => Err(ConfigError::IncompleteBasicAuth {
            present: "username",
            missing: "password",
        }),
        (None, None, Some(_)) => Err(ConfigError::IncompleteBasicAuth {
            present: "password",
            missing: "username",
        }),
        (None, Some(username), Some(password)) => Ok(Credentials::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }),
        (None, None, None) => Ok(Credentials::None),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ProviderConfig {
        ProviderConfig::new().with_endpoint("https://airflow.example.com")
    }

    #[test]
    fn test_parse_full_toml() {
        let config = ProviderConfig::from_toml(
            r#"
base_endpoint = "http://localhost:8080"
username = "admin"
password = "admin"
api_path = "aws_mwaa/cli"
request_timeout_secs = 5
variable_backend = "local"
variables_file = "/tmp/vars.json"

[dag_run]
poll_interval_secs = 2
create_timeout_secs = 60
"#,
        )
        .unwrap();

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.base_endpoint.as_str(), "http://localhost:8080/");
        assert_eq!(
            resolved.credentials,
            Credentials::Basic {
                username: "admin".to_string(),
                password: "admin".to_string()
            }
        );
        assert_eq!(resolved.api_path, "aws_mwaa/cli");
        assert_eq!(resolved.request_timeout, Duration::from_secs(5));
        assert_eq!(resolved.poll_interval, Duration::from_secs(2));
        assert_eq!(resolved.create_timeout, Duration::from_secs(60));
        assert_eq!(resolved.variable_backend, VariableBackend::Local);
        assert_eq!(resolved.variables_file, PathBuf::from("/tmp/vars.json"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ProviderConfig::from_toml("base_endpont = \"http://x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_defaults() {
        let resolved = base().resolve().unwrap();
        assert_eq!(resolved.credentials, Credentials::None);
        assert_eq!(resolved.api_path, DEFAULT_API_PATH);
        assert_eq!(resolved.poll_interval, Duration::from_secs(10));
        assert_eq!(resolved.create_timeout, Duration::from_secs(600));
        assert_eq!(resolved.variable_backend, VariableBackend::Remote);
        assert_eq!(resolved.variables_file, PathBuf::from("airflow_variables.json"));
    }

    #[test]
    fn test_missing_endpoint() {
        let err = ProviderConfig::new().resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "base_endpoint"));
    }

    #[test]
    fn test_endpoint_must_be_http() {
        for bad in ["ftp://airflow", "not a url", "http://"] {
            let err = ProviderConfig::new().with_endpoint(bad).resolve().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEndpoint { .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_bearer_token() {
        let mut config = base();
        config.oauth2_token = Some("tok".to_string());
        assert_eq!(
            config.resolve().unwrap().credentials,
            Credentials::Bearer("tok".to_string())
        );
    }

    #[test]
    fn test_token_conflicts_with_basic() {
        let mut config = base();
        config.oauth2_token = Some("tok".to_string());
        config.username = Some("admin".to_string());
        assert!(matches!(
            config.resolve().unwrap_err(),
            ConfigError::ConflictingAuth(_)
        ));
    }

    #[test]
    fn test_username_requires_password() {
        let mut config = base();
        config.username = Some("admin".to_string());
        assert!(matches!(
            config.resolve().unwrap_err(),
            ConfigError::IncompleteBasicAuth {
                missing: "password",
                ..
            }
        ));

        let mut config = base();
        config.password = Some("secret".to_string());
        assert!(matches!(
            config.resolve().unwrap_err(),
            ConfigError::IncompleteBasicAuth {
                missing: "username",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = base();
        config.dag_run = Some(DagRunConfig {
            poll_interval_secs: Some(0),
            create_timeout_secs: None,
        });
        assert!(matches!(
            config.resolve().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let mut config = base();
        config.dag_run = Some(DagRunConfig {
            poll_interval_secs: Some(5),
            create_timeout_secs: Some(100),
        });

        let mut overlay = ProviderConfig::new().with_endpoint("http://override:8080");
        overlay.dag_run = Some(DagRunConfig {
            poll_interval_secs: None,
            create_timeout_secs: Some(30),
        });
        config.merge(overlay);

        assert_eq!(config.base_endpoint.as_deref(), Some("http://override:8080"));
        let dag_run = config.dag_run.unwrap();
        assert_eq!(dag_run.poll_interval_secs, Some(5));
        assert_eq!(dag_run.create_timeout_secs, Some(30));
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let creds = Credentials::Basic {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
