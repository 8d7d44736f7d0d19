//! Configuration system for the Airflow provider.
//!
//! Provides TOML-based configuration with:
//! - Config file layering (XDG user config, project-local file, explicit path)
//! - Environment overrides (`AIRFLOW_BASE_ENDPOINT`, `AIRFLOW_OAUTH2_TOKEN`,
//!   `AIRFLOW_API_USERNAME`, `AIRFLOW_API_PASSWORD`)
//! - Validation into a [`ResolvedConfig`] with exactly one credential kind
//!
//! ```toml
//! base_endpoint = "https://airflow.example.com"
//! username = "admin"
//! variable_backend = "remote"
//!
//! [dag_run]
//! poll_interval_secs = 10
//! create_timeout_secs = 600
//! ```

pub mod discovery;
pub mod env;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with, xdg_config_dir,
    xdg_config_path,
};
pub use env::{
    ENV_BASE_ENDPOINT, ENV_OAUTH2_TOKEN, ENV_PASSWORD, ENV_USERNAME, apply_env, apply_env_from,
};
pub use error::{ConfigError, Result};
pub use types::*;
