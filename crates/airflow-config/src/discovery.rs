//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/airflow-provider/config.toml` (XDG user config)
//! 2. `./airflow-provider.toml` (project-local)
//! 3. An explicit `--config` path, which must exist
//! 4. Environment variables (see [`crate::env`])

use std::path::{Path, PathBuf};

use crate::{ConfigError, ProviderConfig, Result, apply_env_from};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "airflow-provider.toml";

/// Default config filename within XDG config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "airflow-provider";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "AIRFLOW_PROVIDER_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration (environment applied).
    pub config: ProviderConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (e.g., plaintext secrets).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration from the standard locations plus the process environment.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with(
        xdg_config_path().as_deref(),
        Path::new("."),
        explicit,
        |name| std::env::var(name).ok(),
    )
}

/// Load configuration with every input injected.
///
/// `user_config` is the XDG-level file, `project_dir` holds the
/// project-local file and `env` resolves environment variables.
pub fn load_config_with<F>(
    user_config: Option<&Path>,
    project_dir: &Path,
    explicit: Option<&Path>,
    env: F,
) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ProviderConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    if let Some(path) = user_config {
        sources.push(load_layer(&mut config, path, &mut warnings)?);
    }

    let project_path = project_dir.join(PROJECT_CONFIG_FILE);
    sources.push(load_layer(&mut config, &project_path, &mut warnings)?);

    if let Some(path) = explicit {
        let layer = load_config_file(path)?;
        check_plaintext_secrets(&layer, path, &mut warnings);
        config.merge(layer);
        sources.push(ConfigSource {
            path: path.to_path_buf(),
            loaded: true,
        });
    }

    apply_env_from(&mut config, env);

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load config from a specific file path (no discovery, no environment).
pub fn load_config_file(path: &Path) -> Result<ProviderConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    ProviderConfig::from_toml(&contents)
}

/// Get the XDG config file path for the provider.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the XDG config directory for the provider.
///
/// Checks `AIRFLOW_PROVIDER_CONFIG_DIR` first, then falls back to the platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load an optional config file and merge it into the existing config.
///
/// A missing file is skipped; a malformed one is an error.
fn load_layer(
    config: &mut ProviderConfig,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<ConfigSource> {
    if !path.is_file() {
        return Ok(ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        });
    }

    let layer = load_config_file(path)?;
    check_plaintext_secrets(&layer, path, warnings);
    config.merge(layer);
    Ok(ConfigSource {
        path: path.to_path_buf(),
        loaded: true,
    })
}

fn check_plaintext_secrets(layer: &ProviderConfig, path: &Path, warnings: &mut Vec<String>) {
    if layer.has_plaintext_secret() {
        warnings.push(format!(
            "{} contains a plaintext credential. Consider {} or {} instead.",
            path.display(),
            crate::ENV_OAUTH2_TOKEN,
            crate::ENV_PASSWORD
        ));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
