//! Environment variable overrides.
//!
//! Environment variables form the last configuration layer, so a value
//! exported in the shell always beats the config files.

use crate::ProviderConfig;

/// Base endpoint of the Airflow webserver.
pub const ENV_BASE_ENDPOINT: &str = "AIRFLOW_BASE_ENDPOINT";

/// OAuth2 access token.
pub const ENV_OAUTH2_TOKEN: &str = "AIRFLOW_OAUTH2_TOKEN";

/// Basic-auth user name.
pub const ENV_USERNAME: &str = "AIRFLOW_API_USERNAME";

/// Basic-auth password.
pub const ENV_PASSWORD: &str = "AIRFLOW_API_PASSWORD";

/// Apply overrides from the process environment.
pub fn apply_env(config: &mut ProviderConfig) {
    apply_env_from(config, |name| std::env::var(name).ok());
}

/// Apply overrides using a custom lookup (used by tests and embedders).
///
/// Empty values are ignored.
pub fn apply_env_from<F>(config: &mut ProviderConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(endpoint) = get(ENV_BASE_ENDPOINT) {
        config.base_endpoint = Some(endpoint);
    }
    if let Some(token) = get(ENV_OAUTH2_TOKEN) {
        config.oauth2_token = Some(token);
    }
    if let Some(username) = get(ENV_USERNAME) {
        config.username = Some(username);
    }
    if let Some(password) = get(ENV_PASSWORD) {
        config.password = Some(password);
    }
}
