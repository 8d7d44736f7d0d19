//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Missing required field.
    #[error("missing required field '{field}' (set it in the config file or via {env_var})")]
    MissingField { field: String, env_var: String },

    /// Base endpoint is not an http(s) URL.
    #[error("invalid base_endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    /// Two mutually exclusive credential kinds were configured.
    #[error("conflicting credentials: {0}")]
    ConflictingAuth(String),

    /// Only one half of the basic-auth pair was configured.
    #[error("found {present} for basic auth, but {missing} not specified")]
    IncompleteBasicAuth {
        present: &'static str,
        missing: &'static str,
    },

    /// A numeric setting is out of range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
